use std::time::Duration;

use eventing::{EventAggregator, EventAggregatorConfig};

use crate::location::Location;
use crate::reporter::LocationReporter;
use crate::tracker::LocationTracker;

mod location;
mod reporter;
mod tracker;

// Long enough for every active reporter to print the last location.
const SETTLE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() {
    let aggregator: EventAggregator =
        EventAggregator::new(EventAggregatorConfig::default()).unwrap();
    let tracker = LocationTracker::new(aggregator.clone());

    println!("Start reporter FixedGPS");
    let mut fixed = LocationReporter::new(aggregator.clone(), "FixedGPS");
    fixed.subscribe();

    println!("Start reporter MobileGPS");
    let mut mobile = LocationReporter::new(aggregator.clone(), "MobileGPS");
    mobile.subscribe();

    println!("Send location : Latitude=47.6456, Longitude=-122.1312");
    tracker.track_location(Some(Location::new(47.6456, -122.1312)));
    tokio::time::sleep(SETTLE).await;

    println!("Disable reporter FixedGPS");
    fixed.unsubscribe();

    println!("Send location : Latitude=47.6677, Longitude=-122.1199");
    tracker.track_location(Some(Location::new(47.6677, -122.1199)));
    tokio::time::sleep(SETTLE).await;

    println!("Send location : none");
    tracker.track_location(None);
    tokio::time::sleep(SETTLE).await;

    println!("Disable reporter MobileGPS");
    mobile.unsubscribe();

    println!("Send location : Latitude=0, Longitude=0");
    tracker.track_location(Some(Location::new(0.0, 0.0)));
    tokio::time::sleep(SETTLE).await;

    aggregator.dispose();
}
