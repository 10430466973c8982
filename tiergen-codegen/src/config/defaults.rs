//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Whether to generate data-access classes by default
pub const GENERATE_DAL: bool = true;

/// Whether to generate business-logic classes by default
pub const GENERATE_BLL: bool = true;

/// Default output root; layer folders are created beneath it
pub const OUTPUT_DIR: &str = "./generated";

/// Prefix shared by every generated class name
pub const CLASS_PREFIX: &str = "cls";

/// Extension of generated source files
pub const FILE_EXTENSION: &str = "cs";

/// C# expression the DAL uses to obtain its connection string
pub const CONNECTION_ACCESSOR: &str = "clsDataAccessSettings.ConnectionString";

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
