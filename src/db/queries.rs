//! Catalog queries behind [`SqlServerProvider`](crate::db::SqlServerProvider).
//! Each takes the schema name as `@P1`.

/// Base tables and views, as INFORMATION_SCHEMA reports them.
pub const TABLES: &str = r#"
SELECT TABLE_NAME
FROM INFORMATION_SCHEMA.TABLES
WHERE TABLE_SCHEMA = @P1
ORDER BY TABLE_NAME
"#;

pub const COLUMNS: &str = r#"
SELECT COLUMN_NAME, DATA_TYPE
FROM INFORMATION_SCHEMA.COLUMNS
WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2
ORDER BY ORDINAL_POSITION
"#;

// ROUTINE_DEFINITION is cut at 4000 characters; OBJECT_DEFINITION is not.
pub const ROUTINES: &str = r#"
SELECT r.ROUTINE_NAME,
       OBJECT_DEFINITION(
           OBJECT_ID(QUOTENAME(r.ROUTINE_SCHEMA) + N'.' + QUOTENAME(r.ROUTINE_NAME))
       ) AS ROUTINE_DEFINITION
FROM INFORMATION_SCHEMA.ROUTINES r
WHERE r.ROUTINE_SCHEMA = @P1
ORDER BY r.ROUTINE_NAME
"#;
