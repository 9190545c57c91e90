/// `generations` holds one row per generation attempt. `STRICT` makes SQLite
/// reject values whose type does not match the declared column type, and
/// `AUTOINCREMENT` keeps ids from being reused.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS generations (
  generation_id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id TEXT NOT NULL,
  prompt TEXT NOT NULL,
  generated_text TEXT,
  error TEXT
) STRICT;
"#;
