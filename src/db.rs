use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

// One statement per entry; the driver prepares them individually.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        title         TEXT NOT NULL UNIQUE,
        department_id INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
        description   TEXT,
        is_active     INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        name      TEXT NOT NULL,
        email     TEXT NOT NULL UNIQUE,
        phone     TEXT,
        education TEXT,
        job_id    INTEGER REFERENCES jobs(id) ON DELETE SET NULL,
        hire_date TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_types (
        id                   INTEGER PRIMARY KEY AUTOINCREMENT,
        name                 TEXT NOT NULL UNIQUE,
        annual_allocation    INTEGER NOT NULL,
        max_consecutive_days INTEGER NOT NULL DEFAULT 7,
        min_notice_days      INTEGER NOT NULL DEFAULT 1,
        carry_forward        INTEGER NOT NULL DEFAULT 0,
        is_active            INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_applications (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id      INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
        leave_type_id    INTEGER NOT NULL REFERENCES leave_types(id) ON DELETE CASCADE,
        start_date       TEXT NOT NULL,
        end_date         TEXT NOT NULL,
        days_requested   INTEGER NOT NULL,
        reason           TEXT NOT NULL,
        comments         TEXT,
        rejection_reason TEXT,
        status           TEXT NOT NULL DEFAULT 'pending',
        applied_on       TEXT NOT NULL,
        validated_on     TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_leave_applications_employee_status \
     ON leave_applications(employee_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_leave_applications_dates \
     ON leave_applications(start_date, end_date)",
];

pub async fn init_db(database_url: &str) -> anyhow::Result<SqlitePool> {
    // In-memory sqlite gives every pooled connection its own database, so
    // the pool is clamped to a single connection for :memory: urls.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    for ddl in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .context("schema bootstrap failed")?;
    }
    Ok(())
}
