//! Buyer profile repository.

use sqlx::PgPool;

use wholesale_core::BuyerId;
use wholesale_core::profile::BuyerProfile;

use super::RepositoryError;

const PROFILE_COLUMNS: &str = "buyer_id, company_name, contact_name, email, phone, address, \
     city, postal_code, country, kvk_number, btw_number";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    buyer_id: BuyerId,
    company_name: String,
    contact_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: String,
    kvk_number: Option<String>,
    btw_number: Option<String>,
}

impl From<ProfileRow> for BuyerProfile {
    fn from(r: ProfileRow) -> Self {
        Self {
            buyer_id: r.buyer_id,
            company_name: r.company_name,
            contact_name: r.contact_name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            city: r.city,
            postal_code: r.postal_code,
            country: r.country,
            kvk_number: r.kvk_number,
            btw_number: r.btw_number,
        }
    }
}

/// Repository for buyer profiles.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a buyer's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, buyer_id: BuyerId) -> Result<Option<BuyerProfile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE buyer_id = $1");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(buyer_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(BuyerProfile::from))
    }

    /// Insert or replace a buyer's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, profile: &BuyerProfile) -> Result<BuyerProfile, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO profiles (
                buyer_id, company_name, contact_name, email, phone, address,
                city, postal_code, country, kvk_number, btw_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (buyer_id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                contact_name = EXCLUDED.contact_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                country = EXCLUDED.country,
                kvk_number = EXCLUDED.kvk_number,
                btw_number = EXCLUDED.btw_number,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "
        );

        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(profile.buyer_id)
            .bind(&profile.company_name)
            .bind(&profile.contact_name)
            .bind(&profile.email)
            .bind(&profile.phone)
            .bind(&profile.address)
            .bind(&profile.city)
            .bind(&profile.postal_code)
            .bind(&profile.country)
            .bind(&profile.kvk_number)
            .bind(&profile.btw_number)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }
}
