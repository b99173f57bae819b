use crate::Database;
use crate::models::{
    MessageRow, NewOpportunity, NewUser, OpportunityRow, ProfileChanges, UserRow,
};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

const USER_COLUMNS: &str = "id, username, email, password, firstname, lastname, profile_image, \
     location, full_address, company, companies_invested, companies_worked, role, phone, \
     skillsets, want_investment, about, looking_for_who, provider, signup_date, last_updated";

const MESSAGE_COLUMNS: &str = "seq, id, sender_id, receiver_id, content, created_at";

const OPPORTUNITY_COLUMNS: &str = "id, user_id, role, title, description, want_investment, \
     company_stage, investment_range, skills_required, firstname, lastname, username, location, \
     full_address, profile_image, created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, firstname, lastname)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.firstname,
                    user.lastname
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    /// Login lookup: `identifier` may be the username or the email.
    pub fn get_user_by_login(&self, identifier: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1 OR email = ?1", identifier))
    }

    /// Case-insensitive.
    pub fn username_exists(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
                [username],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    /// Substring match on username, first and last name. An empty query
    /// lists everyone.
    pub fn search_users(&self, query: &str) -> Result<Vec<UserRow>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE username LIKE ?1 ESCAPE '\\'
                    OR firstname LIKE ?1 ESCAPE '\\'
                    OR lastname LIKE ?1 ESCAPE '\\'
                 ORDER BY username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([pattern], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no user has this id.
    pub fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<bool> {
        let skillsets = changes
            .skillsets
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE users SET
                    firstname          = COALESCE(?2, firstname),
                    lastname           = COALESCE(?3, lastname),
                    email              = COALESCE(?4, email),
                    about              = COALESCE(?5, about),
                    location           = COALESCE(?6, location),
                    full_address       = COALESCE(?7, full_address),
                    role               = COALESCE(?8, role),
                    phone              = COALESCE(?9, phone),
                    company            = COALESCE(?10, company),
                    companies_invested = COALESCE(?11, companies_invested),
                    companies_worked   = COALESCE(?12, companies_worked),
                    want_investment    = COALESCE(?13, want_investment),
                    skillsets          = COALESCE(?14, skillsets),
                    looking_for_who    = COALESCE(?15, looking_for_who),
                    last_updated       = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![
                    id,
                    changes.firstname,
                    changes.lastname,
                    changes.email,
                    changes.about,
                    changes.location,
                    changes.full_address,
                    changes.role,
                    changes.phone,
                    changes.company,
                    changes.companies_invested,
                    changes.companies_worked,
                    changes.want_investment,
                    skillsets,
                    changes.looking_for_who,
                ],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Messages --

    /// Appends a message; the store assigns `seq` and `created_at`.
    pub fn insert_message(
        &self,
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            let sql = format!(
                "INSERT INTO messages (id, sender_id, receiver_id, content)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {MESSAGE_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                params![id, sender_id, receiver_id, content],
                message_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_messages_for_participant(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE sender_id = ?1 OR receiver_id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Both directions between two users, oldest first.
    pub fn get_messages_between(&self, user_a: &str, user_b: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE (sender_id = ?1 AND receiver_id = ?2)
                    OR (sender_id = ?2 AND receiver_id = ?1)
                 ORDER BY created_at ASC, seq ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_a, user_b], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Opportunities --

    /// Inserts the opportunity with a snapshot of the poster's profile.
    /// Returns `None` if the poster does not exist.
    pub fn insert_opportunity(&self, opp: &NewOpportunity<'_>) -> Result<Option<OpportunityRow>> {
        let skills = serde_json::to_string(opp.skills_required)?;

        self.with_conn_mut(|conn| {
            let sql = format!(
                "INSERT INTO opportunities (
                    id, user_id, role, title, description, want_investment, company_stage,
                    investment_range, skills_required, firstname, lastname, username, location,
                    full_address, profile_image)
                 SELECT ?1, id, ?3, ?4, ?5, ?6, ?7, ?8, ?9, firstname, lastname, username,
                        location, full_address, profile_image
                 FROM users WHERE id = ?2
                 RETURNING {OPPORTUNITY_COLUMNS}"
            );
            let row = conn
                .query_row(
                    &sql,
                    params![
                        opp.id,
                        opp.user_id,
                        opp.role.as_str(),
                        opp.title,
                        opp.description,
                        opp.want_investment,
                        opp.company_stage,
                        opp.investment_range,
                        skills,
                    ],
                    opportunity_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Newest first.
    pub fn list_opportunities(&self) -> Result<Vec<OpportunityRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], opportunity_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, predicate: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        firstname: row.get(4)?,
        lastname: row.get(5)?,
        profile_image: row.get(6)?,
        location: row.get(7)?,
        full_address: row.get(8)?,
        company: row.get(9)?,
        companies_invested: row.get(10)?,
        companies_worked: row.get(11)?,
        role: row.get(12)?,
        phone: row.get(13)?,
        skillsets: row.get(14)?,
        want_investment: row.get(15)?,
        about: row.get(16)?,
        looking_for_who: row.get(17)?,
        provider: row.get(18)?,
        signup_date: row.get(19)?,
        last_updated: row.get(20)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        seq: row.get(0)?,
        id: row.get(1)?,
        sender_id: row.get(2)?,
        receiver_id: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn opportunity_from_row(row: &Row<'_>) -> rusqlite::Result<OpportunityRow> {
    Ok(OpportunityRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        want_investment: row.get(5)?,
        company_stage: row.get(6)?,
        investment_range: row.get(7)?,
        skills_required: row.get(8)?,
        firstname: row.get(9)?,
        lastname: row.get(10)?,
        username: row.get(11)?,
        location: row.get(12)?,
        full_address: row.get(13)?,
        profile_image: row.get(14)?,
        created_at: row.get(15)?,
    })
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
