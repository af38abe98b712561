//! Command handlers

use tracing::info;

use crate::cli::{Cli, Commands};
use crate::output::{print_route_detail, print_routes, print_scene, print_trucks};
use fleetmap_app::app::{FleetMapController, LoadOutcome};
use fleetmap_app::config::Config;
use fleetmap_app::repository::{open_fleet_source, FleetClient};
use fleetmap_map::Scene;
use fleetmap_types::{DayFilter, OutputFormat, Result};

type Controller = FleetMapController<FleetClient, Scene>;

pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref api_url) = cli.api_url {
        config.api_url = api_url.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Watch {
            day,
            search,
            interval,
            ticks,
            no_routes,
        } => {
            if let Some(ms) = interval {
                config.truck_poll_interval_ms = ms;
            }
            cmd_watch(&config, day, search, ticks, no_routes, output_format).await
        }

        Commands::Trucks => cmd_trucks(&config, output_format).await,

        Commands::Routes { day, search } => cmd_routes(&config, day, search, output_format).await,

        Commands::Route { id, day } => cmd_route(&config, &id, day, output_format).await,

        Commands::DeleteRoute { id } => cmd_delete_route(&config, &id).await,

        Commands::Config {
            show,
            set_url,
            set_interval,
            set_output,
            reset,
        } => cmd_config(show, set_url, set_interval, set_output, reset),
    }
}

fn open_controller(config: &Config) -> Result<Controller> {
    let source = open_fleet_source(config)?;
    Ok(FleetMapController::new(source, Scene::new(), config))
}

async fn cmd_watch(
    config: &Config,
    day: DayFilter,
    search: Option<String>,
    ticks: Option<u64>,
    no_routes: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let mut controller = open_controller(config)?;

    if !no_routes {
        controller.load_routes(day).await?;
        if let Some(term) = search.as_deref() {
            let shown = controller.filter_routes(term);
            info!(term, shown, "routes filtered");
        }
    }

    let mut updates = controller.subscribe();
    controller.start_polling().await;

    let mut printed = 0u64;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let tick = *updates.borrow_and_update();
                print_scene(output_format, &controller, tick)?;
                printed += 1;
                if ticks.is_some_and(|n| printed >= n) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    controller.dispose();
    Ok(())
}

async fn cmd_trucks(config: &Config, output_format: OutputFormat) -> Result<()> {
    let controller = open_controller(config)?;
    controller.load_routes(DayFilter::Today).await?;
    controller.refresh_trucks().await?;

    print_trucks(output_format, &controller.fleet_stats(), &controller.trucks())
}

async fn cmd_routes(
    config: &Config,
    day: DayFilter,
    search: Option<String>,
    output_format: OutputFormat,
) -> Result<()> {
    let controller = open_controller(config)?;
    controller.load_routes(day).await?;
    if let Some(term) = search.as_deref() {
        controller.filter_routes(term);
    }

    let stats = controller.route_stats();
    controller.with_routes(|routes| print_routes(output_format, routes, &stats))
}

async fn cmd_route(config: &Config, id: &str, day: DayFilter, output_format: OutputFormat) -> Result<()> {
    let controller = open_controller(config)?;
    controller.load_routes(day).await?;
    let detail = controller.select_route(id)?;

    print_route_detail(output_format, &detail)
}

async fn cmd_delete_route(config: &Config, id: &str) -> Result<()> {
    let controller = open_controller(config)?;
    let reload = controller.delete_route(id).await?;

    println!("Route {} deleted", id);
    if let LoadOutcome::Applied { routes, .. } = reload {
        println!("{} routes scheduled for today", routes);
    }
    Ok(())
}

fn cmd_config(
    show: bool,
    set_url: Option<String>,
    set_interval: Option<u64>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    // The file only, without the environment override
    let mut config = Config::load_from(&Config::config_path()?)?;
    let mut modified = false;

    if let Some(url) = set_url {
        config.api_url = url;
        modified = true;
    }

    if let Some(ms) = set_interval {
        config.truck_poll_interval_ms = ms;
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.validate()?;
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
