use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthRequests::Mobile).string().not_null())
                    .col(ColumnDef::new(AuthRequests::OtpCode).string())
                    .col(ColumnDef::new(AuthRequests::FirstName).string())
                    .col(ColumnDef::new(AuthRequests::LastName).string())
                    .col(ColumnDef::new(AuthRequests::NationalCode).string())
                    .col(
                        ColumnDef::new(AuthRequests::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthRequests::UserIsRegistered)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuthRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(AuthRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Verification closes every pending sibling for the same mobile.
        manager
            .create_index(
                Index::create()
                    .table(AuthRequests::Table)
                    .col(AuthRequests::Mobile)
                    .col(AuthRequests::Status)
                    .name("idx_auth_requests_mobile_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuthRequests {
    Table,
    Id,
    Mobile,
    OtpCode,
    FirstName,
    LastName,
    NationalCode,
    ExpiresAt,
    UserIsRegistered,
    Status,
    CreatedAt,
}
