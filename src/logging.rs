use flexi_logger::{FileSpec, FlexiLoggerError, Logger, LoggerHandle, WriteMode};
use std::path::Path;

/// Level used when `RUST_LOG` is not set
const DEFAULT_LEVEL: &str = "info";

/// Starts writing log records to `path`.
///
/// The terminal belongs to the calendar while it runs, so records only ever
/// go to a file.  The returned handle must be kept alive for as long as
/// logging is wanted; dropping it flushes and stops the logger.
pub(crate) fn init_file_logging(path: &Path) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(DEFAULT_LEVEL)?
        .log_to_file(FileSpec::try_from(path)?)
        .write_mode(WriteMode::BufferAndFlush)
        .format(flexi_logger::detailed_format)
        .start()
}
