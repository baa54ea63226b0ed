use ds102::{config::StageConfig, plate::WellPosition, protocol::Axis, StageContext};
use simple_logger::SimpleLogger;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Enable logging
	SimpleLogger::new().init().unwrap();

	let path = std::env::args().nth(1).unwrap_or_else(|| "stage.toml".to_string());
	let config = StageConfig::load(&path)?;

	// Connect, then return both axes to their origin.
	let context: StageContext = StageContext::from_config(&config)?;
	context.connect(&config.controller)?;
	if !context.home_all(Duration::from_secs(60))? {
		return Err("the stage did not finish homing".into());
	}

	// Visit the centre of every well and report where the stage ended up.
	for well in context.wells() {
		if !context.move_to_well(&well, WellPosition::Center, Duration::from_secs(30))? {
			log::warn!("{well}: still moving, skipping");
			continue;
		}
		let x = context.get_position(Axis::X)?;
		let y = context.get_position(Axis::Y)?;
		log::info!("{well}: ({x}, {y})");
	}

	context.disconnect();
	Ok(())
}
