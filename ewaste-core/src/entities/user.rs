use crate::framework::DatabaseProcessor;
use ewaste_sdk::objects::UserProfile;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        UserProfile {
            id: record.id,
            name: record.name,
            email: record.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Insert a user. A duplicate email is a unique violation.
pub struct InsertUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl Processor<InsertUser> for DatabaseProcessor {
    type Output = UserRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertUser")]
    async fn process(&self, insert: InsertUser) -> Result<UserRecord, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(insert.name)
        .bind(insert.email)
        .bind(insert.password_hash)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetUserByEmail {
    pub email: String,
}

impl Processor<GetUserByEmail> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserByEmail")]
    async fn process(&self, query: GetUserByEmail) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(query.email)
        .fetch_optional(&self.pool)
        .await
    }
}
