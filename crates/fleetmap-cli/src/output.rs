//! Output formatting module

use chrono::Local;
use serde_json::json;

use fleetmap_app::app::{FleetMapController, RouteDetail};
use fleetmap_app::repository::FleetClient;
use fleetmap_domain::model::{EnrichedTruck, FleetStats, RouteStats};
use fleetmap_domain::RouteStore;
use fleetmap_map::{Scene, TruckMarker};
use fleetmap_types::{today_weekday, OutputFormat, Result};

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn reading(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{:.1}{}", v, unit))
        .unwrap_or_else(|| "-".to_string())
}

fn door(open: bool) -> &'static str {
    if open {
        "Open"
    } else {
        "Closed"
    }
}

pub fn print_trucks(output_format: OutputFormat, stats: &FleetStats, trucks: &[EnrichedTruck]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(&json!({
            "stats": stats,
            "trucks": trucks,
        }))?;
        println!("{}", content);
        return Ok(());
    }

    println!("Fleet");
    println!("=====");
    println!(
        "Total: {}  Available: {}  In route: {}  Maintenance: {}  Out of service: {}",
        stats.total, stats.available, stats.in_route, stats.maintenance, stats.out_of_service
    );
    println!();

    if trucks.is_empty() {
        println!("No truck readings found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<16} {:<14} {:<10} {:<20} {:>7} {:>6} {:<6} {:>20}",
        "Plate", "Vehicle", "Status", "Driver", "Route", "Temp", "Hum", "Door", "Position"
    );
    println!("{}", "-".repeat(117));

    for truck in trucks {
        let position = truck
            .location()
            .map(|p| format!("{:.5}, {:.5}", p.latitude, p.longitude))
            .unwrap_or_else(|| "(no fix)".to_string());
        println!(
            "{:<10} {:<16} {:<14} {:<10} {:<20} {:>7} {:>6} {:<6} {:>20}",
            truncate(&truck.truck.license_plate, 10),
            truncate(&truck.truck.vehicle(), 16),
            truncate(truck.truck.state_text(), 14),
            truncate(truck.driver_first_name(), 10),
            truncate(truck.route_name(), 20),
            reading(truck.reading.temperature, "°C"),
            reading(truck.reading.humidity, "%"),
            door(truck.reading.door_open),
            position,
        );
    }

    Ok(())
}

pub fn print_routes(output_format: OutputFormat, routes: &RouteStore, stats: &RouteStats) -> Result<()> {
    let today = today_weekday();

    if output_format == OutputFormat::Json {
        let listed: Vec<_> = routes
            .colored_routes()
            .into_iter()
            .map(|(route, color)| {
                json!({
                    "route": route,
                    "color": color,
                    "activeToday": route.runs_on(today),
                })
            })
            .collect();
        let content = serde_json::to_string_pretty(&json!({
            "day": routes.day().to_string(),
            "search": routes.search_term(),
            "stats": stats,
            "routes": listed,
        }))?;
        println!("{}", content);
        return Ok(());
    }

    println!("Routes ({})", routes.day());
    println!("==========");
    println!(
        "Total: {}  Active today: {}  Stores: {}  Assigned drivers: {}",
        stats.total_routes, stats.active_today, stats.total_stores, stats.assigned_drivers
    );
    if !routes.search_term().is_empty() {
        println!(
            "Filter: \"{}\" ({} of {})",
            routes.search_term(),
            routes.filtered_routes().len(),
            routes.all_routes().len()
        );
    }
    println!();

    let listed = routes.colored_routes();
    if listed.is_empty() {
        println!("No routes found.");
        return Ok(());
    }

    println!(
        "{:<26} {:<24} {:<8} {:<20} {:>5} {:<28} {:<5}",
        "ID", "Name", "Color", "Driver", "Stops", "Days", "Today"
    );
    println!("{}", "-".repeat(122));

    for (route, color) in listed {
        let days: Vec<&str> = route
            .delivery_days
            .iter()
            .filter_map(|d| fleetmap_types::day_name(*d))
            .map(|name| &name[..3])
            .collect();
        println!(
            "{:<26} {:<24} {:<8} {:<20} {:>5} {:<28} {:<5}",
            truncate(&route.id, 26),
            truncate(&route.name, 24),
            color,
            truncate(&route.driver_name(), 20),
            route.stops.len(),
            days.join(" "),
            if route.runs_on(today) { "yes" } else { "" },
        );
    }

    Ok(())
}

pub fn print_route_detail(output_format: OutputFormat, detail: &RouteDetail) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(detail)?;
        println!("{}", content);
        return Ok(());
    }

    println!("{}", detail.name);
    println!("{}", "=".repeat(detail.name.chars().count().max(5)));
    println!("Route ID:  {}", detail.id);
    println!("Driver:    {}", detail.driver_name);
    println!("Days:      {}", detail.days_text());
    println!("Color:     {}", detail.color);
    println!();

    if detail.stops.is_empty() {
        println!("No stores assigned");
        return Ok(());
    }

    println!("{:>4}  {:<30} {:<16} {:<40}", "Seq", "Store", "Phone", "Address");
    println!("{}", "-".repeat(94));
    for stop in &detail.stops {
        println!(
            "{:>4}  {:<30} {:<16} {:<40}",
            stop.sequence,
            truncate(&stop.store_name, 30),
            stop.phone.as_deref().unwrap_or("N/A"),
            truncate(stop.address.as_deref().unwrap_or("N/A"), 40),
        );
    }

    Ok(())
}

/// One watch frame: the whole scene as JSON, or a summary plus marker list
pub fn print_scene(
    output_format: OutputFormat,
    controller: &FleetMapController<FleetClient, Scene>,
    tick: u64,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = controller.with_backend(|scene| {
            serde_json::to_string(&json!({
                "tick": tick,
                "polling": controller.polling_state().to_string(),
                "scene": scene,
            }))
        })?;
        println!("{}", content);
        return Ok(());
    }

    let stats = controller.fleet_stats();
    let state = controller.polling_state();
    controller.with_backend(|scene| {
        println!();
        println!(
            "[{}] tick {}  trucks on map: {}/{}  routes: {}  polling: {}",
            Local::now().format("%H:%M:%S"),
            tick,
            scene.trucks().len(),
            stats.total,
            scene.routes().len(),
            state,
        );
        for marker in scene.trucks() {
            print_marker(marker);
        }
    });

    Ok(())
}

fn print_marker(marker: &TruckMarker) {
    let popup = &marker.popup;
    println!(
        "  {:<10} {:<16} {:<20} {:<8} {:>7} {:>6} {:<6} ({:.5}, {:.5})",
        truncate(&popup.license_plate, 10),
        truncate(&popup.status, 16),
        truncate(&popup.route_name, 20),
        popup.route_color,
        reading(popup.temperature, "°C"),
        reading(popup.humidity, "%"),
        door(popup.door_open),
        marker.position.latitude,
        marker.position.longitude,
    );
}
