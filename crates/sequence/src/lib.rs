// Log template mining core: scanning, pattern matching and pattern discovery.

// Core infrastructure
pub mod error;
pub mod registry;
pub mod conf;

// Pipeline stages
pub mod scanner;
pub mod sequence;
pub mod parser;
pub mod analyzer;

pub use analyzer::{complexity_score, Analyzer};
pub use conf::SequenceConfig;
pub use error::{AnalyzeError, ConfigError, ParseError, ScanError};
pub use parser::{ParseMatch, Parser, PatternId};
pub use registry::{TagRegistry, TagType, TokenType};
pub use scanner::{Scan, Scanner};
pub use sequence::{Modifier, Sequence, Token};
