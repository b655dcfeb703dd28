//! Logging setup for the binary. File output goes to `./grabber.log`.

use std::path::Path;

use engine_logging::LogDestination;

const LOG_FILE: &str = "./grabber.log";

pub fn initialize(destination: LogDestination, verbosity: u8) {
    engine_logging::initialize(
        destination,
        engine_logging::level_from_verbosity(verbosity),
        Path::new(LOG_FILE),
    );
}
