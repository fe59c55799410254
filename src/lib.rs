//! # telegraf-bacnet - BACnet readings as InfluxDB line protocol
//!
//! Producers polling BACnet devices report one attribute at a time. This
//! crate groups those attribute readings per object and prints a single line
//! protocol record once the object's `presentValue` arrives, with every
//! buffered attribute attached as a tag.
//!
//! ## Core Concepts
//!
//! - **Reading**: one observed attribute of a BACnet object, with a nanosecond timestamp
//! - **Identity**: `<objectInstanceNumber>_<deviceIdentifier>`, the grouping key
//! - **Aggregator**: buffers non-trigger readings and merges them into the trigger reading
//! - **LineFormatter**: renders a merged record as one or more line protocol lines
//! - **Printer**: multi-producer front end with a single worker thread
//!
//! ## Usage
//!
//! ```rust,no_run
//! use telegraf_bacnet::{Printer, PrinterConfig, Tag};
//!
//! let printer = Printer::start(PrinterConfig::default(), std::io::stdout())?;
//! let tags = vec![Tag::new("objectInstanceNumber", 1), Tag::new("deviceIdentifier", 10)];
//! printer.submit("units", "degF", tags.clone());
//! printer.submit("presentValue", 72.3, tags);
//! printer.close()?;
//! # Ok::<(), telegraf_bacnet::BacnetError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod input;
pub mod line_protocol;
pub mod printer;
pub mod reading;
pub mod value;

pub use aggregator::{Aggregator, AggregatorStats, MergedRecord, PendingEntry};
pub use config::{AggregatorConfig, PrinterConfig, DEFAULT_PREFIX, PRESENT_VALUE};
pub use error::{BacnetError, BacnetResult, ConfigError, InputError, PrinterError};
pub use input::{pump, InputStats};
pub use line_protocol::{render, LineFormatter};
pub use printer::{Printer, PrinterStats, ShutdownToken, Submitter, WorkerStats};
pub use reading::{Identity, Reading, Tag, DEVICE_IDENTIFIER, OBJECT_INSTANCE_NUMBER};
pub use value::{FieldValue, Scalar};
