use sqlx::PgPool;

/// Pool-backed executor for the `kanau` query processors in [`crate::entities`].
///
/// Statements that must share a transaction are associated functions taking
/// `&mut sqlx::Transaction` instead (the `*_tx` helpers).
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
