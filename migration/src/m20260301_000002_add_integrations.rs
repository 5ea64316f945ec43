use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE tandem_platform.integration_provider AS ENUM \
                 ('slack', 'google-drive', 'notion', 'zapier', 'discord', 'google-analytics')",
            )
            .await?;

        // 'disconnected' is the absence of a row and is never stored.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE tandem_platform.integration_status AS ENUM \
                 ('pending', 'connected', 'error')",
            )
            .await?;

        // One row per (user, provider); reconnecting overwrites it in place.
        // `credentials` holds JSON, or AES-256-GCM ciphertext when `encrypted` is true.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS tandem_platform.integrations (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id VARCHAR(255) NOT NULL,

                provider tandem_platform.integration_provider NOT NULL,
                status tandem_platform.integration_status NOT NULL DEFAULT 'pending',

                credentials TEXT NOT NULL,
                encrypted BOOLEAN NOT NULL DEFAULT FALSE,

                connected_at TIMESTAMPTZ,
                last_activity TIMESTAMPTZ,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                UNIQUE(user_id, provider)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_integrations_user_id
                 ON tandem_platform.integrations(user_id)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS tandem_platform.integrations")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS tandem_platform.integration_status")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS tandem_platform.integration_provider")
            .await?;

        Ok(())
    }
}
