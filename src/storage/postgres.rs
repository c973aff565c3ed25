//! Postgres storage

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::postgres::PgSslMode;
use uuid::Uuid;

use crate::activity::ActivityKind;
use crate::coupons::Coupon;
use crate::pages::Page;
use crate::pages::PageElements;
use crate::pages::PageMedia;
use crate::pages::PageNote;
use crate::pages::PageSticker;
use crate::pages::PageText;
use crate::push_tokens::PushToken;
use crate::quests::ActivityCounts;
use crate::relationships::Member;
use crate::relationships::MemberRole;
use crate::relationships::MemberStatus;
use crate::relationships::Relationship;
use crate::scrapbooks::Cover;
use crate::scrapbooks::Details;
use crate::scrapbooks::Scrapbook;
use crate::users::User;

use super::Activity;
use super::ChangePasswordValues;
use super::CreateCouponValues;
use super::CreateMediaValues;
use super::CreateMemberValues;
use super::CreateNoteValues;
use super::CreatePageValues;
use super::CreateRelationshipValues;
use super::CreateScrapbookValues;
use super::CreateStickerValues;
use super::CreateTextValues;
use super::CreateUserValues;
use super::Error;
use super::RegisterPushTokenValues;
use super::Result;
use super::Storage;
use super::UpdateDetailsValues;
use super::UpdateMediaValues;
use super::UpdateNoteValues;
use super::UpdateScrapbookValues;
use super::UpdateStickerValues;
use super::UpdateTextValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

/// SSL is required when the connection string asks for it, preferred otherwise
fn ssl_mode_for(database_url: &str) -> PgSslMode {
    if database_url.contains("sslmode=require") {
        PgSslMode::Require
    } else {
        PgSslMode::Prefer
    }
}

impl Postgres {
    /// Connect to Postgres with a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)
            .map_err(connection_error)?
            .ssl_mode(ssl_mode_for(database_url));

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .map_err(connection_error)?;

        Self::with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Migration(err.to_string()))?;

        Ok(Self { connection_pool })
    }
}

/// Postgres version of a scrapbook, the cover is stored inline
#[derive(sqlx::FromRow)]
struct PostgresScrapbook {
    id: Uuid,
    relationship_id: Uuid,
    created_by_user_id: Uuid,
    title: String,
    cover_blob_key: Option<String>,
    cover_url: Option<String>,
    cover_width: Option<i32>,
    cover_height: Option<i32>,
    #[sqlx(flatten)]
    details: Details,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Scrapbook {
    /// Create scrapbook from postgres version
    fn from_postgres_scrapbook(scrapbook: PostgresScrapbook) -> Self {
        let cover = match (
            scrapbook.cover_blob_key,
            scrapbook.cover_url,
            scrapbook.cover_width,
            scrapbook.cover_height,
        ) {
            (Some(blob_key), Some(url), Some(width), Some(height)) => Some(Cover {
                blob_key,
                url,
                width,
                height,
            }),
            _ => None,
        };

        Self {
            id: scrapbook.id,
            relationship_id: scrapbook.relationship_id,
            created_by_user_id: scrapbook.created_by_user_id,
            title: scrapbook.title,
            cover,
            details: scrapbook.details,
            created_at: scrapbook.created_at,
            updated_at: scrapbook.updated_at,
        }
    }
}

/// Map any sqlx error to a storage connection error
fn connection_error<E: ToString>(err: E) -> Error {
    Error::Connection(err.to_string())
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT id, session_id, email, display_name, hashed_password, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT id, session_id, email, display_name, hashed_password, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, session_id, email, display_name, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, session_id, email, display_name, hashed_password, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.email)
        .bind(values.display_name)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn change_password(
        &self,
        user: &User,
        values: &ChangePasswordValues<'_>,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET session_id = $2, hashed_password = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, session_id, email, display_name, hashed_password, created_at, updated_at
            ",
        )
        .bind(user.id)
        .bind(values.session_id)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_active_relationship_by_user(&self, user: &User) -> Result<Option<Relationship>> {
        sqlx::query_as::<_, Relationship>(
            r"
            SELECT r.id, r.invite_code, r.created_at, r.updated_at
            FROM relationships r
            JOIN members m ON m.relationship_id = r.id
            WHERE m.user_id = $1 AND m.status = 'active'
            LIMIT 1
            ",
        )
        .bind(user.id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_pending_relationships_by_user(&self, user: &User) -> Result<Vec<Relationship>> {
        sqlx::query_as::<_, Relationship>(
            r"
            SELECT r.id, r.invite_code, r.created_at, r.updated_at
            FROM relationships r
            JOIN members m ON m.relationship_id = r.id
            WHERE m.user_id = $1 AND m.status = 'pending'
            ORDER BY m.created_at
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_relationship_by_id(&self, id: &Uuid) -> Result<Option<Relationship>> {
        sqlx::query_as::<_, Relationship>(
            r"
            SELECT id, invite_code, created_at, updated_at
            FROM relationships
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_relationship_by_invite_code(
        &self,
        invite_code: &str,
    ) -> Result<Option<Relationship>> {
        sqlx::query_as::<_, Relationship>(
            r"
            SELECT id, invite_code, created_at, updated_at
            FROM relationships
            WHERE invite_code = $1
            ",
        )
        .bind(invite_code)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_all_members_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Member>> {
        sqlx::query_as::<_, Member>(
            r"
            SELECT
                m.relationship_id,
                m.user_id,
                u.email,
                u.display_name,
                m.role,
                m.status,
                m.created_at,
                m.updated_at
            FROM members m
            JOIN users u ON u.id = m.user_id
            WHERE m.relationship_id = $1
            ORDER BY m.created_at
            ",
        )
        .bind(relationship.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_member(
        &self,
        relationship_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Member>> {
        sqlx::query_as::<_, Member>(
            r"
            SELECT
                m.relationship_id,
                m.user_id,
                u.email,
                u.display_name,
                m.role,
                m.status,
                m.created_at,
                m.updated_at
            FROM members m
            JOIN users u ON u.id = m.user_id
            WHERE m.relationship_id = $1 AND m.user_id = $2
            ",
        )
        .bind(relationship_id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_relationship(
        &self,
        values: &CreateRelationshipValues<'_>,
    ) -> Result<Relationship> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        let relationship = sqlx::query_as::<_, Relationship>(
            r"
            INSERT INTO relationships (id, invite_code)
            VALUES ($1, $2)
            RETURNING id, invite_code, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.invite_code)
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        sqlx::query(
            r"
            INSERT INTO members (relationship_id, user_id, role, status)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(relationship.id)
        .bind(values.user.id)
        .bind(MemberRole::Owner)
        .bind(MemberStatus::Active)
        .execute(&mut *transaction)
        .await
        .map_err(connection_error)?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(relationship)
    }

    async fn create_member(
        &self,
        relationship: &Relationship,
        values: &CreateMemberValues<'_>,
    ) -> Result<Member> {
        sqlx::query_as::<_, Member>(
            r"
            WITH inserted AS (
                INSERT INTO members (relationship_id, user_id, role, status)
                VALUES ($1, $2, $3, $4)
                RETURNING relationship_id, user_id, role, status, created_at, updated_at
            )
            SELECT
                i.relationship_id,
                i.user_id,
                u.email,
                u.display_name,
                i.role,
                i.status,
                i.created_at,
                i.updated_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            ",
        )
        .bind(relationship.id)
        .bind(values.user.id)
        .bind(values.role)
        .bind(values.status)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn activate_member(&self, member: &Member) -> Result<Member> {
        sqlx::query_as::<_, Member>(
            r"
            WITH updated AS (
                UPDATE members
                SET status = 'active', updated_at = CURRENT_TIMESTAMP
                WHERE relationship_id = $1 AND user_id = $2
                RETURNING relationship_id, user_id, role, status, created_at, updated_at
            )
            SELECT
                m.relationship_id,
                m.user_id,
                u.email,
                u.display_name,
                m.role,
                m.status,
                m.created_at,
                m.updated_at
            FROM updated m
            JOIN users u ON u.id = m.user_id
            ",
        )
        .bind(member.relationship_id)
        .bind(member.user_id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_all_coupons_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Coupon>> {
        sqlx::query_as::<_, Coupon>(
            r"
            SELECT
                id,
                relationship_id,
                issuer_user_id,
                recipient_user_id,
                title,
                description,
                template_id,
                status,
                expires_at,
                redeemed_at,
                created_at,
                updated_at
            FROM coupons
            WHERE relationship_id = $1
            ORDER BY created_at DESC, id
            ",
        )
        .bind(relationship.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_coupon_by_id(&self, id: &Uuid) -> Result<Option<Coupon>> {
        sqlx::query_as::<_, Coupon>(
            r"
            SELECT
                id,
                relationship_id,
                issuer_user_id,
                recipient_user_id,
                title,
                description,
                template_id,
                status,
                expires_at,
                redeemed_at,
                created_at,
                updated_at
            FROM coupons
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_coupon(&self, values: &CreateCouponValues<'_>) -> Result<Coupon> {
        sqlx::query_as::<_, Coupon>(
            r"
            INSERT INTO coupons (
                id,
                relationship_id,
                issuer_user_id,
                recipient_user_id,
                title,
                description,
                template_id,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id,
                relationship_id,
                issuer_user_id,
                recipient_user_id,
                title,
                description,
                template_id,
                status,
                expires_at,
                redeemed_at,
                created_at,
                updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.relationship.id)
        .bind(values.issuer.id)
        .bind(values.recipient_user_id)
        .bind(values.title)
        .bind(values.description)
        .bind(values.template_id)
        .bind(values.expires_at)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn redeem_coupon(
        &self,
        coupon: &Coupon,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>> {
        sqlx::query_as::<_, Coupon>(
            r"
            UPDATE coupons
            SET status = 'REDEEMED', redeemed_at = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = 'ACTIVE' AND (expires_at IS NULL OR expires_at > $2)
            RETURNING
                id,
                relationship_id,
                issuer_user_id,
                recipient_user_id,
                title,
                description,
                template_id,
                status,
                expires_at,
                redeemed_at,
                created_at,
                updated_at
            ",
        )
        .bind(coupon.id)
        .bind(redeemed_at)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_coupon(&self, coupon: &Coupon) -> Result<()> {
        sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(coupon.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn expire_coupons(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE coupons
            SET status = 'EXPIRED', updated_at = $1
            WHERE status = 'ACTIVE' AND expires_at <= $1
            ",
        )
        .bind(now)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected())
    }

    async fn find_all_scrapbooks_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Scrapbook>> {
        let scrapbooks = sqlx::query_as::<_, PostgresScrapbook>(
            r"
            SELECT
                id,
                relationship_id,
                created_by_user_id,
                title,
                cover_blob_key,
                cover_url,
                cover_width,
                cover_height,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            FROM scrapbooks
            WHERE relationship_id = $1
            ORDER BY created_at DESC, id
            ",
        )
        .bind(relationship.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(scrapbooks
            .into_iter()
            .map(Scrapbook::from_postgres_scrapbook)
            .collect())
    }

    async fn find_single_scrapbook_by_id(&self, id: &Uuid) -> Result<Option<Scrapbook>> {
        let scrapbook = sqlx::query_as::<_, PostgresScrapbook>(
            r"
            SELECT
                id,
                relationship_id,
                created_by_user_id,
                title,
                cover_blob_key,
                cover_url,
                cover_width,
                cover_height,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            FROM scrapbooks
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(scrapbook.map(Scrapbook::from_postgres_scrapbook))
    }

    async fn create_scrapbook(&self, values: &CreateScrapbookValues<'_>) -> Result<Scrapbook> {
        let scrapbook = sqlx::query_as::<_, PostgresScrapbook>(
            r"
            INSERT INTO scrapbooks (
                id,
                relationship_id,
                created_by_user_id,
                title,
                cover_blob_key,
                cover_url,
                cover_width,
                cover_height,
                date,
                place,
                place_id,
                mood_tags,
                review
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING
                id,
                relationship_id,
                created_by_user_id,
                title,
                cover_blob_key,
                cover_url,
                cover_width,
                cover_height,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.relationship.id)
        .bind(values.user.id)
        .bind(values.title)
        .bind(values.cover.map(|cover| cover.blob_key.as_str()))
        .bind(values.cover.map(|cover| cover.url.as_str()))
        .bind(values.cover.map(|cover| cover.width))
        .bind(values.cover.map(|cover| cover.height))
        .bind(values.details.date)
        .bind(values.details.place.as_deref())
        .bind(values.details.place_id.as_deref())
        .bind(&values.details.mood_tags)
        .bind(values.details.review.as_deref())
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(Scrapbook::from_postgres_scrapbook(scrapbook))
    }

    async fn update_scrapbook(
        &self,
        scrapbook: &Scrapbook,
        values: &UpdateScrapbookValues,
    ) -> Result<Option<Scrapbook>> {
        let merged = values.merge(scrapbook);
        let cover = merged.cover.as_ref();

        let scrapbook = sqlx::query_as::<_, PostgresScrapbook>(
            r"
            UPDATE scrapbooks
            SET
                title = $2,
                cover_blob_key = $3,
                cover_url = $4,
                cover_width = $5,
                cover_height = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING
                id,
                relationship_id,
                created_by_user_id,
                title,
                cover_blob_key,
                cover_url,
                cover_width,
                cover_height,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            ",
        )
        .bind(merged.id)
        .bind(&merged.title)
        .bind(cover.map(|cover| cover.blob_key.as_str()))
        .bind(cover.map(|cover| cover.url.as_str()))
        .bind(cover.map(|cover| cover.width))
        .bind(cover.map(|cover| cover.height))
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(scrapbook.map(Scrapbook::from_postgres_scrapbook))
    }

    async fn update_scrapbook_details(
        &self,
        scrapbook: &Scrapbook,
        values: &UpdateDetailsValues,
    ) -> Result<Option<Scrapbook>> {
        let details = values.merge(&scrapbook.details);

        let scrapbook = sqlx::query_as::<_, PostgresScrapbook>(
            r"
            UPDATE scrapbooks
            SET
                date = $2,
                place = $3,
                place_id = $4,
                mood_tags = $5,
                review = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING
                id,
                relationship_id,
                created_by_user_id,
                title,
                cover_blob_key,
                cover_url,
                cover_width,
                cover_height,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            ",
        )
        .bind(scrapbook.id)
        .bind(details.date)
        .bind(details.place.as_deref())
        .bind(details.place_id.as_deref())
        .bind(&details.mood_tags)
        .bind(details.review.as_deref())
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(scrapbook.map(Scrapbook::from_postgres_scrapbook))
    }

    async fn delete_scrapbook(&self, scrapbook: &Scrapbook) -> Result<()> {
        // pages and their elements cascade
        sqlx::query("DELETE FROM scrapbooks WHERE id = $1")
            .bind(scrapbook.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn find_all_pages_by_scrapbook(&self, scrapbook: &Scrapbook) -> Result<Vec<Page>> {
        sqlx::query_as::<_, Page>(
            r"
            SELECT
                id,
                scrapbook_id,
                page_index,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            FROM pages
            WHERE scrapbook_id = $1
            ORDER BY page_index
            ",
        )
        .bind(scrapbook.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_page_by_id(
        &self,
        scrapbook_id: &Uuid,
        page_id: &Uuid,
    ) -> Result<Option<Page>> {
        sqlx::query_as::<_, Page>(
            r"
            SELECT
                id,
                scrapbook_id,
                page_index,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            FROM pages
            WHERE scrapbook_id = $1 AND id = $2
            ",
        )
        .bind(scrapbook_id)
        .bind(page_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_page(
        &self,
        scrapbook: &Scrapbook,
        values: &CreatePageValues<'_>,
    ) -> Result<Page> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        // serialize page creation and deletion per scrapbook
        sqlx::query("SELECT id FROM scrapbooks WHERE id = $1 FOR UPDATE")
            .bind(scrapbook.id)
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;

        let page = sqlx::query_as::<_, Page>(
            r"
            INSERT INTO pages (
                id,
                scrapbook_id,
                page_index,
                date,
                place,
                place_id,
                mood_tags,
                review
            )
            SELECT $1, $2, COUNT(*)::INTEGER, $3, $4, $5, $6, $7
            FROM pages
            WHERE scrapbook_id = $2
            RETURNING
                id,
                scrapbook_id,
                page_index,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(scrapbook.id)
        .bind(values.details.date)
        .bind(values.details.place.as_deref())
        .bind(values.details.place_id.as_deref())
        .bind(&values.details.mood_tags)
        .bind(values.details.review.as_deref())
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(page)
    }

    async fn update_page_details(
        &self,
        page: &Page,
        values: &UpdateDetailsValues,
    ) -> Result<Option<Page>> {
        let details = values.merge(&page.details);

        sqlx::query_as::<_, Page>(
            r"
            UPDATE pages
            SET
                date = $2,
                place = $3,
                place_id = $4,
                mood_tags = $5,
                review = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING
                id,
                scrapbook_id,
                page_index,
                date,
                place,
                place_id,
                mood_tags,
                review,
                created_at,
                updated_at
            ",
        )
        .bind(page.id)
        .bind(details.date)
        .bind(details.place.as_deref())
        .bind(details.place_id.as_deref())
        .bind(&details.mood_tags)
        .bind(details.review.as_deref())
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_page(&self, page: &Page) -> Result<()> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        sqlx::query("SELECT id FROM scrapbooks WHERE id = $1 FOR UPDATE")
            .bind(page.scrapbook_id)
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;

        // elements cascade, later pages shift by the stored index
        let page_index = sqlx::query_scalar::<_, i32>(
            "DELETE FROM pages WHERE id = $1 RETURNING page_index",
        )
        .bind(page.id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(connection_error)?;

        let Some(page_index) = page_index else {
            return Ok(());
        };

        sqlx::query(
            r"
            UPDATE pages
            SET page_index = page_index - 1
            WHERE scrapbook_id = $1 AND page_index > $2
            ",
        )
        .bind(page.scrapbook_id)
        .bind(page_index)
        .execute(&mut *transaction)
        .await
        .map_err(connection_error)?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(())
    }

    async fn find_page_elements(&self, page: &Page) -> Result<PageElements> {
        let media = sqlx::query_as::<_, PageMedia>(
            r"
            SELECT
                id,
                page_id,
                kind,
                blob_key,
                url,
                width,
                height,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            FROM page_media
            WHERE page_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(page.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        let stickers = sqlx::query_as::<_, PageSticker>(
            r"
            SELECT id, page_id, kind, x, y, scale, rotation, created_by_user_id, created_at, updated_at
            FROM page_stickers
            WHERE page_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(page.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        let texts = sqlx::query_as::<_, PageText>(
            r"
            SELECT
                id,
                page_id,
                text,
                font,
                color,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            FROM page_texts
            WHERE page_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(page.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        let notes = sqlx::query_as::<_, PageNote>(
            r"
            SELECT id, page_id, text, color, x, y, created_by_user_id, created_at, updated_at
            FROM page_notes
            WHERE page_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(page.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(PageElements {
            media,
            stickers,
            texts,
            notes,
        })
    }

    async fn find_single_media(
        &self,
        page_id: &Uuid,
        media_id: &Uuid,
    ) -> Result<Option<PageMedia>> {
        sqlx::query_as::<_, PageMedia>(
            r"
            SELECT
                id,
                page_id,
                kind,
                blob_key,
                url,
                width,
                height,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            FROM page_media
            WHERE page_id = $1 AND id = $2
            ",
        )
        .bind(page_id)
        .bind(media_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_media(
        &self,
        page: &Page,
        values: &CreateMediaValues<'_>,
    ) -> Result<PageMedia> {
        sqlx::query_as::<_, PageMedia>(
            r"
            INSERT INTO page_media (
                id,
                page_id,
                kind,
                blob_key,
                url,
                width,
                height,
                x,
                y,
                scale,
                rotation,
                created_by_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING
                id,
                page_id,
                kind,
                blob_key,
                url,
                width,
                height,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(page.id)
        .bind(values.kind)
        .bind(values.blob_key)
        .bind(values.url)
        .bind(values.width)
        .bind(values.height)
        .bind(values.transform.x)
        .bind(values.transform.y)
        .bind(values.transform.scale)
        .bind(values.transform.rotation)
        .bind(values.user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn update_media(
        &self,
        media: &PageMedia,
        values: &UpdateMediaValues,
    ) -> Result<Option<PageMedia>> {
        let merged = values.merge(media);

        sqlx::query_as::<_, PageMedia>(
            r"
            UPDATE page_media
            SET x = $2, y = $3, scale = $4, rotation = $5, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING
                id,
                page_id,
                kind,
                blob_key,
                url,
                width,
                height,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            ",
        )
        .bind(merged.id)
        .bind(merged.transform.x)
        .bind(merged.transform.y)
        .bind(merged.transform.scale)
        .bind(merged.transform.rotation)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_media(&self, media: &PageMedia) -> Result<()> {
        sqlx::query("DELETE FROM page_media WHERE id = $1")
            .bind(media.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn find_single_sticker(
        &self,
        page_id: &Uuid,
        sticker_id: &Uuid,
    ) -> Result<Option<PageSticker>> {
        sqlx::query_as::<_, PageSticker>(
            r"
            SELECT id, page_id, kind, x, y, scale, rotation, created_by_user_id, created_at, updated_at
            FROM page_stickers
            WHERE page_id = $1 AND id = $2
            ",
        )
        .bind(page_id)
        .bind(sticker_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_sticker(
        &self,
        page: &Page,
        values: &CreateStickerValues<'_>,
    ) -> Result<PageSticker> {
        sqlx::query_as::<_, PageSticker>(
            r"
            INSERT INTO page_stickers (id, page_id, kind, x, y, scale, rotation, created_by_user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, page_id, kind, x, y, scale, rotation, created_by_user_id, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(page.id)
        .bind(values.kind)
        .bind(values.transform.x)
        .bind(values.transform.y)
        .bind(values.transform.scale)
        .bind(values.transform.rotation)
        .bind(values.user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn update_sticker(
        &self,
        sticker: &PageSticker,
        values: &UpdateStickerValues,
    ) -> Result<Option<PageSticker>> {
        let merged = values.merge(sticker);

        sqlx::query_as::<_, PageSticker>(
            r"
            UPDATE page_stickers
            SET kind = $2, x = $3, y = $4, scale = $5, rotation = $6, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, page_id, kind, x, y, scale, rotation, created_by_user_id, created_at, updated_at
            ",
        )
        .bind(merged.id)
        .bind(merged.kind)
        .bind(merged.transform.x)
        .bind(merged.transform.y)
        .bind(merged.transform.scale)
        .bind(merged.transform.rotation)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_sticker(&self, sticker: &PageSticker) -> Result<()> {
        sqlx::query("DELETE FROM page_stickers WHERE id = $1")
            .bind(sticker.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn find_single_text(&self, page_id: &Uuid, text_id: &Uuid) -> Result<Option<PageText>> {
        sqlx::query_as::<_, PageText>(
            r"
            SELECT
                id,
                page_id,
                text,
                font,
                color,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            FROM page_texts
            WHERE page_id = $1 AND id = $2
            ",
        )
        .bind(page_id)
        .bind(text_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_text(&self, page: &Page, values: &CreateTextValues<'_>) -> Result<PageText> {
        sqlx::query_as::<_, PageText>(
            r"
            INSERT INTO page_texts (
                id,
                page_id,
                text,
                font,
                color,
                x,
                y,
                scale,
                rotation,
                created_by_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id,
                page_id,
                text,
                font,
                color,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(page.id)
        .bind(values.text)
        .bind(values.font)
        .bind(values.color)
        .bind(values.transform.x)
        .bind(values.transform.y)
        .bind(values.transform.scale)
        .bind(values.transform.rotation)
        .bind(values.user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn update_text(&self, text: &PageText, values: &UpdateTextValues) -> Result<Option<PageText>> {
        let merged = values.merge(text);

        sqlx::query_as::<_, PageText>(
            r"
            UPDATE page_texts
            SET
                text = $2,
                font = $3,
                color = $4,
                x = $5,
                y = $6,
                scale = $7,
                rotation = $8,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING
                id,
                page_id,
                text,
                font,
                color,
                x,
                y,
                scale,
                rotation,
                created_by_user_id,
                created_at,
                updated_at
            ",
        )
        .bind(merged.id)
        .bind(&merged.text)
        .bind(merged.font)
        .bind(&merged.color)
        .bind(merged.transform.x)
        .bind(merged.transform.y)
        .bind(merged.transform.scale)
        .bind(merged.transform.rotation)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_text(&self, text: &PageText) -> Result<()> {
        sqlx::query("DELETE FROM page_texts WHERE id = $1")
            .bind(text.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn find_single_note(&self, page_id: &Uuid, note_id: &Uuid) -> Result<Option<PageNote>> {
        sqlx::query_as::<_, PageNote>(
            r"
            SELECT id, page_id, text, color, x, y, created_by_user_id, created_at, updated_at
            FROM page_notes
            WHERE page_id = $1 AND id = $2
            ",
        )
        .bind(page_id)
        .bind(note_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_note(&self, page: &Page, values: &CreateNoteValues<'_>) -> Result<PageNote> {
        sqlx::query_as::<_, PageNote>(
            r"
            INSERT INTO page_notes (id, page_id, text, color, x, y, created_by_user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, page_id, text, color, x, y, created_by_user_id, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(page.id)
        .bind(values.text)
        .bind(values.color)
        .bind(values.x)
        .bind(values.y)
        .bind(values.user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn update_note(&self, note: &PageNote, values: &UpdateNoteValues) -> Result<Option<PageNote>> {
        let merged = values.merge(note);

        sqlx::query_as::<_, PageNote>(
            r"
            UPDATE page_notes
            SET text = $2, color = $3, x = $4, y = $5, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, page_id, text, color, x, y, created_by_user_id, created_at, updated_at
            ",
        )
        .bind(merged.id)
        .bind(&merged.text)
        .bind(merged.color)
        .bind(merged.x)
        .bind(merged.y)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_note(&self, note: &PageNote) -> Result<()> {
        sqlx::query("DELETE FROM page_notes WHERE id = $1")
            .bind(note.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn register_push_token(
        &self,
        user: &User,
        values: &RegisterPushTokenValues<'_>,
    ) -> Result<PushToken> {
        sqlx::query_as::<_, PushToken>(
            r"
            INSERT INTO push_tokens (id, user_id, token, platform)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token) DO UPDATE
            SET user_id = EXCLUDED.user_id, platform = EXCLUDED.platform, updated_at = CURRENT_TIMESTAMP
            RETURNING id, user_id, token, platform, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(values.token)
        .bind(values.platform)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_push_token(&self, user: &User, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM push_tokens WHERE user_id = $1 AND token = $2")
            .bind(user.id)
            .bind(token)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn register_activity(&self, user: &User, activity: &Activity<'_>) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO activity (id, relationship_id, user_id, kind, subject_id)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(activity.relationship_id())
        .bind(user.id)
        .bind(activity.kind())
        .bind(activity.subject_id())
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn count_activity_since(
        &self,
        relationship_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<ActivityCounts> {
        let counts = sqlx::query_as::<_, (ActivityKind, i64)>(
            r"
            SELECT kind, COUNT(*)
            FROM activity
            WHERE relationship_id = $1 AND created_at >= $2
            GROUP BY kind
            ",
        )
        .bind(relationship_id)
        .bind(since)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(counts.into_iter().collect())
    }
}
