//! Typed decision variables of the rotation model.

use std::collections::HashMap;

use crate::assembler::ProblemData;
use crate::config::ModelOptions;
use crate::model::linear::{MilpModel, VarId, VarKind};

/// Problem dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub teams: usize,
    pub groups: usize,
    pub courses: usize,
}

impl Dims {
    pub fn of(data: &ProblemData) -> Self {
        Self {
            teams: data.team_count(),
            groups: data.group_count(),
            courses: data.course_count(),
        }
    }

    fn slot_index(&self, slot: Slot) -> usize {
        (slot.team * self.groups + slot.group) * self.courses + slot.course
    }

    /// All (team, group, course) slots, team-major.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.teams).flat_map(move |team| {
            (0..self.groups).flat_map(move |group| {
                (0..self.courses).map(move |course| Slot::new(team, group, course))
            })
        })
    }
}

/// Team `team` sits in group `group` during course `course`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub team: usize,
    pub group: usize,
    pub course: usize,
}

impl Slot {
    pub const fn new(team: usize, group: usize, course: usize) -> Self {
        Self {
            team,
            group,
            course,
        }
    }
}

/// Team `team`, seated in group `group`, travels from the location of team
/// `from` to the location of team `to` for course `course`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcKey {
    pub course: usize,
    pub from: usize,
    pub to: usize,
    pub team: usize,
    pub group: usize,
}

impl ArcKey {
    pub fn slot(&self) -> Slot {
        Slot::new(self.team, self.group, self.course)
    }
}

/// Variable handles, addressable by typed keys.
#[derive(Debug, Clone)]
pub struct DecisionVars {
    dims: Dims,
    assign: Vec<VarId>,
    chef: Vec<VarId>,
    arcs: Vec<(ArcKey, VarId)>,
    arcs_by_slot: Vec<Vec<usize>>,
    arc_index: HashMap<ArcKey, usize>,
    large: Vec<VarId>,
    max_duration: Option<VarId>,
}

impl DecisionVars {
    /// Declares every variable of the model in `milp`.
    pub fn declare(milp: &mut MilpModel, data: &ProblemData, options: &ModelOptions) -> Self {
        let dims = Dims::of(data);
        let slot_count = dims.teams * dims.groups * dims.courses;

        let mut assign = Vec::with_capacity(slot_count);
        let mut chef = Vec::with_capacity(slot_count);
        for slot in dims.slots() {
            assign.push(milp.add_var(
                format!("assign_t{}_g{}_c{}", slot.team, slot.group, slot.course),
                VarKind::Binary,
            ));
            chef.push(milp.add_var(
                format!("chef_t{}_g{}_c{}", slot.team, slot.group, slot.course),
                VarKind::Binary,
            ));
        }

        let mut arcs = Vec::new();
        let mut arcs_by_slot = vec![Vec::new(); slot_count];
        let mut arc_index = HashMap::new();
        for slot in dims.slots() {
            for from in 0..dims.teams {
                for to in 0..dims.teams {
                    let key = ArcKey {
                        course: slot.course,
                        from,
                        to,
                        team: slot.team,
                        group: slot.group,
                    };
                    if !arc_admissible(&key, data, options) {
                        continue;
                    }
                    let var = milp.add_var(
                        format!(
                            "arc_c{}_i{}_j{}_t{}_g{}",
                            key.course, key.from, key.to, key.team, key.group
                        ),
                        VarKind::Binary,
                    );
                    arcs_by_slot[dims.slot_index(slot)].push(arcs.len());
                    arc_index.insert(key, arcs.len());
                    arcs.push((key, var));
                }
            }
        }

        let large = if options.large_teams > 0 {
            (0..dims.teams)
                .map(|team| milp.add_var(format!("large_t{}", team), VarKind::Binary))
                .collect()
        } else {
            Vec::new()
        };

        let max_duration = options.include_max_duration.then(|| {
            milp.add_var(
                "max_duration".to_string(),
                VarKind::Continuous {
                    lower: 0.0,
                    upper: None,
                },
            )
        });

        Self {
            dims,
            assign,
            chef,
            arcs,
            arcs_by_slot,
            arc_index,
            large,
            max_duration,
        }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn assign(&self, slot: Slot) -> VarId {
        self.assign[self.dims.slot_index(slot)]
    }

    pub fn chef(&self, slot: Slot) -> VarId {
        self.chef[self.dims.slot_index(slot)]
    }

    /// `None` when the arc was never admissible (equivalent to fixed at 0).
    pub fn arc(&self, key: ArcKey) -> Option<VarId> {
        self.arc_index.get(&key).map(|&index| self.arcs[index].1)
    }

    pub fn arcs(&self) -> &[(ArcKey, VarId)] {
        &self.arcs
    }

    /// Arcs available to a team while it sits in `slot`.
    pub fn arcs_of(&self, slot: Slot) -> impl Iterator<Item = &(ArcKey, VarId)> + '_ {
        self.arcs_by_slot[self.dims.slot_index(slot)]
            .iter()
            .map(move |&index| &self.arcs[index])
    }

    /// Arcs of `team` in `course`, across all groups.
    pub fn team_arcs(&self, team: usize, course: usize) -> impl Iterator<Item = &(ArcKey, VarId)> + '_ {
        (0..self.dims.groups).flat_map(move |group| self.arcs_of(Slot::new(team, group, course)))
    }

    pub fn large(&self, team: usize) -> Option<VarId> {
        self.large.get(team).copied()
    }

    pub fn max_duration(&self) -> Option<VarId> {
        self.max_duration
    }
}

/// Arc domain.
///
/// In the first course a team leaves from home. Later legs never stay in
/// place: arriving at `i` and leaving from `i` to `i` would make `i` host
/// twice. Under the short-hop policy, legs between distinct hosts whose
/// duration is at or below the threshold do not exist.
fn arc_admissible(key: &ArcKey, data: &ProblemData, options: &ModelOptions) -> bool {
    if key.course == 0 {
        if key.from != key.team {
            return false;
        }
    } else if key.from == key.to {
        return false;
    }

    if key.from != key.to {
        if let Some(threshold) = options.same_place_threshold {
            if data.travel.leg(key.from, key.to, key.course) <= threshold {
                return false;
            }
        }
    }
    true
}
