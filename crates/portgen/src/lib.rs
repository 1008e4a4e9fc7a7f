//! Pipeline driver for the port generator.
//!
//! `portgen` enumerates C++ headers under an input directory, collects them
//! into one entity graph with [`portgen_codegen`], runs every emitter over the
//! completed graph and persists the result through an [`OutputSink`].
//!
//! # Example
//!
//! ```ignore
//! use portgen::{DirectorySink, PortgenConfig, run};
//!
//! let config = PortgenConfig::load(std::path::Path::new("."));
//! let mut sink = DirectorySink::new(config.output_dir());
//! let report = run(&config, &mut sink)?;
//! println!("{report}");
//! ```

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod workspace;

pub use config::PortgenConfig;
pub use logging::init_tracing;
pub use pipeline::{PipelineError, Report, discover_inputs, run, run_with};
pub use workspace::{DirectorySink, MemorySink, OutputSink, WorkspaceError};
