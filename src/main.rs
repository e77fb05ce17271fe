use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDateTime};
use clap::{ArgAction, ArgMatches, Command, arg, value_parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dinner_planner::assembler::{Assembler, geocode_roster};
use dinner_planner::cache::{Cached, default_cache_path};
use dinner_planner::config::{EventSchedule, ModelOptions};
use dinner_planner::error::ProviderError;
use dinner_planner::haversine::StraightLine;
use dinner_planner::model::build_model;
use dinner_planner::motis::{MotisClient, MotisConfig};
use dinner_planner::nominatim::{NominatimClient, NominatimConfig};
use dinner_planner::osrm::{OsrmClient, OsrmConfig};
use dinner_planner::planner::solve_model;
use dinner_planner::rate_limit::Throttled;
use dinner_planner::report::{PlanExport, render_text};
use dinner_planner::solver::{GoodLpBackend, SolveOptions};
use dinner_planner::team::{Team, load_roster};
use dinner_planner::traits::{GeoPoint, Geocoder, TravelTimeProvider};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Nominatim allows one request per second.
const GEOCODER_INTERVAL: Duration = Duration::from_secs(1);

fn cli() -> Command {
    Command::new("dinner-planner")
        .about("Plans a running dinner: who cooks which course, who eats where")
        .arg(
            arg!(<CSV_FILE> "Roster: name,address,contact,diet[,one preference per course]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"course-time" <TIME> "Start of a course, \"YYYY-MM-DD HH:MM\"; repeat per course")
                .required(true)
                .action(ArgAction::Append)
                .value_parser(parse_time),
        )
        .arg(
            arg!(--"afterparty-time" <TIME> "Start of the afterparty, \"YYYY-MM-DD HH:MM\"")
                .value_parser(parse_time),
        )
        .arg(arg!(--afterparty <ADDRESS> "Address of the afterparty"))
        .arg(
            arg!(--"num-courses" <COURSES> "Number of courses")
                .default_value("3")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--timeout <SECONDS> "Solver time budget")
                .default_value("3600")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(--"large-teams" <COUNT> "Number of large teams that must never meet")
                .default_value("0")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--"min-travel" <MINUTES> "Minimum travel time per team, 0 disables")
                .default_value("1")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(--"cook-incompatible" <TEAMS> "Comma separated team indices that must not cook for each other")
                .value_delimiter(',')
                .value_parser(value_parser!(usize)),
        )
        .arg(arg!(--"can-meet-again" "Allow two teams to share more than one course"))
        .arg(arg!(--"can-stay" "Allow consecutive courses at (nearly) the same place"))
        .arg(arg!(--"ignore-preferences" "Ignore course preferences"))
        .arg(arg!(--"asymmetric-distances" "Query both directions of every route"))
        .arg(arg!(--"ignore-avg-dist" "Do not minimise the average travel time"))
        .arg(arg!(--"ignore-max-dist" "Do not minimise the longest travel time"))
        .arg(
            arg!(--backend <BACKEND> "Travel time backend")
                .default_value("osrm")
                .value_parser(["osrm", "motis", "straight-line"]),
        )
        .arg(arg!(--"osrm-url" <URL> "OSRM base URL").default_value("http://localhost:5000"))
        .arg(arg!(--"motis-url" <URL> "MOTIS base URL").default_value("http://localhost:8080"))
        .arg(
            arg!(--"nominatim-url" <URL> "Nominatim base URL")
                .default_value("https://nominatim.openstreetmap.org"),
        )
        .arg(arg!(--cache <PATH> "Travel cache file").value_parser(value_parser!(PathBuf)))
        .arg(
            arg!(--"write-lp" <PATH> "Write the model in LP format before solving")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn parse_time(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|err| format!("expected \"YYYY-MM-DD HH:MM\": {}", err))
}

struct Settings {
    roster: PathBuf,
    schedule: EventSchedule,
    afterparty: Option<String>,
    options: ModelOptions,
    solve: SolveOptions,
    symmetric: bool,
    backend: String,
    osrm_url: String,
    motis_url: String,
    nominatim_url: String,
    cache: PathBuf,
    write_lp: Option<PathBuf>,
}

impl Settings {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let roster = matches
            .get_one::<PathBuf>("CSV_FILE")
            .cloned()
            .ok_or_else(|| anyhow!("missing roster file"))?;
        let courses = matches.get_one::<usize>("num-courses").copied().unwrap_or(3);

        let times: Vec<NaiveDateTime> = matches
            .get_many::<NaiveDateTime>("course-time")
            .map(|times| times.copied().collect())
            .unwrap_or_default();
        let afterparty_time = matches.get_one::<NaiveDateTime>("afterparty-time").copied();
        let now = Local::now().naive_local();
        if let Some(past) = times.iter().chain(afterparty_time.iter()).find(|&&time| time <= now) {
            bail!("{} is not in the future", past.format(TIME_FORMAT));
        }
        let schedule = EventSchedule::new(courses, &times, afterparty_time)
            .ok_or_else(|| anyhow!("at least one --course-time is required"))?;

        let incompatible: Vec<usize> = matches
            .get_many::<usize>("cook-incompatible")
            .map(|teams| teams.copied().collect())
            .unwrap_or_default();
        let options = ModelOptions {
            unique_meetings: !matches.get_flag("can-meet-again"),
            use_preferences: !matches.get_flag("ignore-preferences"),
            include_max_duration: !matches.get_flag("ignore-max-dist"),
            include_average_duration: !matches.get_flag("ignore-avg-dist"),
            min_travel_minutes: matches
                .get_one::<u32>("min-travel")
                .copied()
                .filter(|&minutes| minutes > 0),
            same_place_threshold: if matches.get_flag("can-stay") {
                None
            } else {
                ModelOptions::default().same_place_threshold
            },
            large_teams: matches.get_one::<usize>("large-teams").copied().unwrap_or(0),
            ..ModelOptions::default()
        }
        .with_incompatible_group(&incompatible);

        let timeout = matches.get_one::<u64>("timeout").copied().unwrap_or(3600);
        let text = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();

        Ok(Self {
            roster,
            schedule,
            afterparty: matches.get_one::<String>("afterparty").cloned(),
            options,
            solve: SolveOptions {
                time_budget: Duration::from_secs(timeout),
            },
            symmetric: !matches.get_flag("asymmetric-distances"),
            backend: text("backend"),
            osrm_url: text("osrm-url"),
            motis_url: text("motis-url"),
            nominatim_url: text("nominatim-url"),
            cache: matches
                .get_one::<PathBuf>("cache")
                .cloned()
                .unwrap_or_else(default_cache_path),
            write_lp: matches.get_one::<PathBuf>("write-lp").cloned(),
        })
    }
}

/// Geocoding and routing behind one cache.
struct Services<R> {
    geocoder: Throttled<NominatimClient>,
    router: R,
}

impl<R> Geocoder for Services<R> {
    fn locate(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        self.geocoder.locate(address)
    }
}

impl<R: TravelTimeProvider> TravelTimeProvider for Services<R> {
    fn name(&self) -> &str {
        self.router.name()
    }

    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        self.router.duration_between(from, to, at)
    }

    fn duration_to_afterparty(
        &self,
        from: GeoPoint,
        afterparty: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        self.router.duration_to_afterparty(from, afterparty, at)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    if let Err(e) = Settings::from_matches(&matches).and_then(run) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(settings: Settings) -> Result<()> {
    let file = File::open(&settings.roster)
        .with_context(|| format!("cannot open {}", settings.roster.display()))?;
    let teams = load_roster(
        file,
        settings.schedule.course_count(),
        settings.options.use_preferences,
    )?;
    info!(teams = teams.len(), "loaded roster");

    let geocoder = Throttled::new(
        NominatimClient::new(NominatimConfig {
            base_url: settings.nominatim_url.clone(),
            ..NominatimConfig::default()
        })?,
        GEOCODER_INTERVAL,
    );

    match settings.backend.as_str() {
        "osrm" => {
            let router = OsrmClient::new(OsrmConfig {
                base_url: settings.osrm_url.clone(),
                ..OsrmConfig::default()
            })?;
            plan_with(Services { geocoder, router }, teams, &settings)
        }
        "motis" => {
            let router = MotisClient::new(MotisConfig {
                base_url: settings.motis_url.clone(),
                ..MotisConfig::default()
            })?;
            plan_with(Services { geocoder, router }, teams, &settings)
        }
        "straight-line" => plan_with(
            Services {
                geocoder,
                router: StraightLine::default(),
            },
            teams,
            &settings,
        ),
        other => bail!("unknown backend `{}`", other),
    }
}

fn plan_with<R>(services: Services<R>, teams: Vec<Team>, settings: &Settings) -> Result<()>
where
    R: TravelTimeProvider + Sync,
{
    let cache = Cached::open(services, &settings.cache)
        .with_context(|| format!("cannot read cache {}", settings.cache.display()))?;

    let assembled = (|| -> Result<_> {
        let locations = geocode_roster(&cache, &teams)?;
        let afterparty = settings
            .afterparty
            .as_deref()
            .map(|address| cache.locate(address))
            .transpose()?;
        let mut assembler = Assembler::new(&cache, &settings.schedule);
        if !settings.symmetric {
            assembler = assembler.asymmetric();
        }
        Ok(assembler.assemble(teams, &locations, afterparty)?)
    })();
    // Keep whatever was fetched, even if assembly failed halfway.
    cache.save()?;
    let data = assembled?;

    let model = build_model(&data, &settings.options)?;
    if let Some(path) = &settings.write_lp {
        fs::write(path, model.milp().to_lp_format())
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), "wrote LP model");
    }

    let plan = solve_model(&model, &data, &settings.options, &GoodLpBackend, &settings.solve)?;
    eprintln!("{}", render_text(&data.teams, &plan.decoded));
    println!("{}", PlanExport::new(&data.teams, &plan.decoded).to_json()?);
    Ok(())
}
