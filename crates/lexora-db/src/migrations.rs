use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, messages, opportunities)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                username            TEXT NOT NULL UNIQUE COLLATE NOCASE,
                email               TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password            TEXT NOT NULL,
                firstname           TEXT NOT NULL DEFAULT '',
                lastname            TEXT NOT NULL DEFAULT '',
                profile_image       TEXT,
                location            TEXT,
                full_address        TEXT,
                company             TEXT,
                companies_invested  TEXT,
                companies_worked    TEXT,
                role                TEXT,
                phone               TEXT,
                skillsets           TEXT NOT NULL DEFAULT '[]',
                want_investment     TEXT,
                about               TEXT,
                looking_for_who     TEXT,
                provider            TEXT NOT NULL DEFAULT 'local',
                signup_date         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                last_updated        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            -- Append-only. No foreign keys: the log outlives directory entries.
            CREATE TABLE messages (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT NOT NULL UNIQUE,
                sender_id       TEXT NOT NULL,
                receiver_id     TEXT NOT NULL,
                content         TEXT NOT NULL CHECK (length(content) > 0),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                CHECK (sender_id <> receiver_id)
            );

            CREATE INDEX idx_messages_sender
                ON messages(sender_id, created_at);

            CREATE INDEX idx_messages_receiver
                ON messages(receiver_id, created_at);

            CREATE TABLE opportunities (
                id                  TEXT PRIMARY KEY,
                user_id             TEXT NOT NULL REFERENCES users(id),
                role                TEXT NOT NULL,
                title               TEXT NOT NULL,
                description         TEXT NOT NULL,
                want_investment     TEXT,
                company_stage       TEXT,
                investment_range    TEXT,
                skills_required     TEXT NOT NULL DEFAULT '[]',
                firstname           TEXT NOT NULL,
                lastname            TEXT NOT NULL,
                username            TEXT NOT NULL,
                location            TEXT,
                full_address        TEXT,
                profile_image       TEXT,
                created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_opportunities_created
                ON opportunities(created_at);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
