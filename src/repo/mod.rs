mod notices;
mod interactions;

#[cfg(test)]
pub(crate) mod test;

use anyhow::anyhow;
use sqlx::{Pool, Postgres};
use sqlx::postgres::PgQueryResult;
pub use notices::*;
pub use interactions::*;
use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Repositories {
    pub notices: Notices,
    pub interactions: Interactions,
}

impl Repositories {
    pub fn new(db_conn: &Pool<Postgres>) -> Self {
        Self {
            notices: Notices::new(db_conn.clone()),
            interactions: Interactions::new(db_conn.clone()),
        }
    }
}

pub async fn establish_database_connection(config: &DatabaseConfig) -> Result<Pool<Postgres>, anyhow::Error> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.url.as_str()).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}


#[macro_export]
macro_rules! repository {
    ($name:ident, $($methods:item),*) => {
        #[derive(Clone)]
        pub struct $name {
            pool: sqlx::Pool<sqlx::Postgres>,
        }

        impl $name {
            pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
                Self { pool }
            }

            $($methods)*
        }
    };
}

/// Zero rows is reported as [sqlx::Error::RowNotFound] so callers can tell a missing notice from a broken query.
fn ensure_only_one_row_updated(res: PgQueryResult) -> Result<PgQueryResult, anyhow::Error> {
    match res.rows_affected() {
        1 => Ok(res),
        0 => Err(sqlx::Error::RowNotFound.into()),
        x => Err(anyhow!("not only one row was updated but {x}"))
    }
}
