use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

/// Participants (registered people and their lucky numbers)
#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    Name,
    Email,
    LuckyNumber,
    CreatedAt,
}

/// Draw records (one row per winner drawn in a session)
#[derive(DeriveIden)]
enum DrawRecords {
    Table,
    Id,
    SessionId,
    ParticipantId,
    LuckyNumber,
    Position,
    CreatedAt,
}

/// Session (singleton row, id = 1)
#[derive(DeriveIden)]
enum Session {
    Table,
    Id,
    Active,
    SessionId,
    DrawCount,
    CreatedAt,
    EndedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participants::Name).string().not_null())
                    .col(
                        ColumnDef::new(Participants::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::LuckyNumber)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DrawRecords::SessionId).string().not_null())
                    .col(
                        ColumnDef::new(DrawRecords::ParticipantId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrawRecords::LuckyNumber).integer().not_null())
                    .col(ColumnDef::new(DrawRecords::Position).integer().not_null())
                    .col(
                        ColumnDef::new(DrawRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // SQLite cannot add a foreign key with ALTER TABLE
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_records_participant")
                            .from(DrawRecords::Table, DrawRecords::ParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // one position per session, one draw per participant per session
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_records_session_position")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::SessionId)
                    .col(DrawRecords::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_records_session_participant")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::SessionId)
                    .col(DrawRecords::ParticipantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Session::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Session::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Session::Active)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Session::SessionId).string().null())
                    .col(
                        ColumnDef::new(Session::DrawCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Session::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Session::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // seed the singleton session row
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "INSERT OR IGNORE INTO session (id) VALUES (1);".to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // records reference participants, drop them first
        manager
            .drop_table(Table::drop().if_exists().table(DrawRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Session::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Participants::Table).to_owned())
            .await?;

        Ok(())
    }
}
