use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== ORGANIZATIONS ==========
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Organizations::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Organizations::AutoSyncEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Organizations::SyncIntervalMinutes)
                            .integer()
                            .not_null()
                            .default(15),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(Organizations::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Case-insensitive unique index on organization name
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX organizations_name_lower_idx ON organizations (LOWER(name))",
            )
            .await?;

        // ========== VENDORS ==========
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vendors::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Vendors::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Vendors::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Vendors::VendorType).string_len(32).not_null())
                    .col(ColumnDef::new(Vendors::Credentials).json_binary().not_null())
                    .col(ColumnDef::new(Vendors::BaseUrl).string_len(256))
                    .col(
                        ColumnDef::new(Vendors::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Vendors::LastSyncedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Vendors::LastAlertSyncedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Vendors::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(Vendors::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vendors_organization")
                            .from(Vendors::Table, Vendors::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_vendors_organization ON vendors (organization_id)")
            .await?;

        // ========== PLANTS ==========
        manager
            .create_table(
                Table::create()
                    .table(Plants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plants::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Plants::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Plants::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Plants::VendorPlantId).string_len(64).not_null())
                    .col(ColumnDef::new(Plants::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Plants::Address).text())
                    .col(ColumnDef::new(Plants::CapacityKw).double())
                    .col(ColumnDef::new(Plants::CurrentPowerKw).double())
                    .col(ColumnDef::new(Plants::DailyEnergyKwh).double())
                    .col(ColumnDef::new(Plants::MonthlyEnergyKwh).double())
                    .col(ColumnDef::new(Plants::YearlyEnergyKwh).double())
                    .col(ColumnDef::new(Plants::TotalEnergyKwh).double())
                    .col(ColumnDef::new(Plants::PerformanceRatio).double())
                    .col(ColumnDef::new(Plants::NetworkStatus).string_len(32))
                    .col(ColumnDef::new(Plants::LastUpdateTime).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Plants::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(Plants::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plants_vendor")
                            .from(Plants::Table, Plants::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plants_organization")
                            .from(Plants::Table, Plants::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key used by the sync upsert
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX plants_vendor_plant_idx ON plants (vendor_id, vendor_plant_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_plants_organization ON plants (organization_id)")
            .await?;

        // ========== ALERTS ==========
        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alerts::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Alerts::PlantId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::VendorAlertId).string_len(64).not_null())
                    .col(ColumnDef::new(Alerts::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Alerts::DeviceType).string_len(64))
                    .col(ColumnDef::new(Alerts::DeviceSn).string_len(64))
                    .col(ColumnDef::new(Alerts::Severity).string_len(16).not_null())
                    .col(ColumnDef::new(Alerts::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Alerts::AlertTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alerts::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Alerts::GridDownSeconds).big_integer())
                    .col(
                        ColumnDef::new(Alerts::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(Alerts::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_plant")
                            .from(Alerts::Table, Alerts::PlantId)
                            .to(Plants::Table, Plants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_vendor")
                            .from(Alerts::Table, Alerts::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key used by the alert upsert
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX alerts_vendor_alert_idx ON alerts (vendor_id, vendor_alert_id, plant_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_alerts_plant ON alerts (plant_id)")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_alerts_status ON alerts (status)")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_alerts_time ON alerts (alert_time DESC)")
            .await?;

        // ========== SYNC RUNS ==========
        manager
            .create_table(
                Table::create()
                    .table(SyncRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncRuns::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(SyncRuns::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(SyncRuns::Trigger).string_len(16).not_null())
                    .col(
                        ColumnDef::new(SyncRuns::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncRuns::DurationMs).big_integer().not_null())
                    .col(
                        ColumnDef::new(SyncRuns::TotalVendors)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Successful)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Failed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SyncRuns::Synced).integer().not_null().default(0))
                    .col(ColumnDef::new(SyncRuns::Created).integer().not_null().default(0))
                    .col(ColumnDef::new(SyncRuns::Updated).integer().not_null().default(0))
                    .col(ColumnDef::new(SyncRuns::Results).json_binary())
                    .col(
                        ColumnDef::new(SyncRuns::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_sync_runs_started ON sync_runs (started_at DESC)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order of dependencies
        manager
            .drop_table(Table::drop().table(SyncRuns::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alerts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plants::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(Organizations::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Organizations {
    Table,
    Id,
    Name,
    AutoSyncEnabled,
    SyncIntervalMinutes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Vendors {
    Table,
    Id,
    OrganizationId,
    Name,
    VendorType,
    Credentials,
    BaseUrl,
    IsActive,
    LastSyncedAt,
    LastAlertSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Plants {
    Table,
    Id,
    VendorId,
    OrganizationId,
    VendorPlantId,
    Name,
    Address,
    CapacityKw,
    CurrentPowerKw,
    DailyEnergyKwh,
    MonthlyEnergyKwh,
    YearlyEnergyKwh,
    TotalEnergyKwh,
    PerformanceRatio,
    NetworkStatus,
    LastUpdateTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Alerts {
    Table,
    Id,
    PlantId,
    VendorId,
    VendorAlertId,
    Name,
    DeviceType,
    DeviceSn,
    Severity,
    Status,
    AlertTime,
    EndTime,
    GridDownSeconds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum SyncRuns {
    Table,
    Id,
    Kind,
    Trigger,
    StartedAt,
    DurationMs,
    TotalVendors,
    Successful,
    Failed,
    Synced,
    Created,
    Updated,
    Results,
    CreatedAt,
}
