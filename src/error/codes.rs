/// Error code registry
///
/// Error codes are organized by category:
/// - 1000-1999: Argument and configuration errors
/// - 2000-2999: Table structure errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Execution errors
/// - 5000-5999: Pipeline errors
pub struct ErrorCode;

impl ErrorCode {
    // Argument and configuration errors (1000-1999)
    pub const ARGUMENT_INVALID: u16 = 1000;

    // Table structure errors (2000-2999)
    pub const TABLE_GENERIC: u16 = 2000;
    pub const TABLE_SHAPE_MISMATCH: u16 = 2001;
    pub const TABLE_DUPLICATE_COLUMN: u16 = 2002;
    pub const TABLE_UNKNOWN_COLUMN: u16 = 2003;
    pub const TABLE_COLUMN_COLLISION: u16 = 2004;
    pub const TABLE_ROW_AXIS_MISMATCH: u16 = 2005;
    pub const TABLE_ENTRY_OUT_OF_BOUNDS: u16 = 2006;
    pub const TABLE_FORMAT: u16 = 2007;

    // Storage errors (3000-3999)
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_NOT_FOUND: u16 = 3004;
    pub const STORAGE_CORRUPTED: u16 = 3006;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXEC_SIGNAL_RECEIVED: u16 = 4005;
    pub const EXEC_SPAWN_FAILED: u16 = 4007;
    pub const EXEC_MISSING_OUTPUT: u16 = 4011;

    // Pipeline errors (5000-5999)
    pub const PIPELINE_INVALID_TRANSITION: u16 = 5001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Invalid argument",

        2000 => "Generic table error",
        2001 => "Identifier lists do not match the matrix shape",
        2002 => "Duplicate column identifier",
        2003 => "Unknown column identifier",
        2004 => "Column identifier appears in more than one table",
        2005 => "Tables have different row identifiers",
        2006 => "Matrix entry outside the declared shape",
        2007 => "Malformed table file",

        3001 => "Storage I/O error",
        3004 => "Storage item not found",
        3006 => "Stored table is corrupted",

        4000 => "Generic execution error",
        4001 => "Command not found",
        4003 => "Subprocess failed",
        4005 => "Command received signal",
        4007 => "Failed to spawn subprocess",
        4011 => "Subprocess did not write its declared output",

        5001 => "Invalid pipeline state transition",

        _ => "Unknown error code",
    }
}
