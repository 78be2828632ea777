//! Fixture header syntax: the `// [SKIP ]PARAM:` directive line.

pub mod parser;

pub use parser::{parse_directives, parse_header, parse_param_line, ParamLine};
