use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Accounts {
    Table,
    UserId,
    FullName,
    Email,
    PasswordHash,
    Phone,
    Address,
    City,
    Country,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Plans {
    Table,
    PlanId,
    Name,
    Code,
    PriceAmount,
    PriceCurrency,
    BillingPeriod,
    DownloadMbps,
    UploadMbps,
    DataCapGb,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    SubscriptionId,
    UserId,
    PlanId,
    Status,
    StartDate,
    CurrentPeriodEnd,
    AutoRenew,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TransactionsHistory {
    Table,
    Id,
    UserId,
    SubscriptionId,
    Amount,
    Currency,
    EventType,
    Description,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    TicketId,
    UserId,
    Subject,
    Priority,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SupportMessages {
    Table,
    Id,
    TicketId,
    SenderId,
    SenderRole,
    MessageText,
    Attachments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserUsage {
    Table,
    Id,
    UserId,
    SubscriptionId,
    BytesUp,
    BytesDown,
    RecordedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // enums
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("billing_period"))
                    .values(vec![Alias::new("monthly"), Alias::new("annual")])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("subscription_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("active"),
                        Alias::new("canceled"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("transaction_event_type"))
                    .values(vec![
                        Alias::new("payment"),
                        Alias::new("plan_cancellation"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("ticket_status"))
                    .values(vec![
                        Alias::new("open"),
                        Alias::new("in_progress"),
                        Alias::new("closed"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("ticket_priority"))
                    .values(vec![
                        Alias::new("low"),
                        Alias::new("normal"),
                        Alias::new("high"),
                        Alias::new("urgent"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("sender_role"))
                    .values(vec![Alias::new("customer"), Alias::new("agent")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::FullName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Accounts::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accounts::Phone).string_len(64).null())
                    .col(ColumnDef::new(Accounts::Address).string_len(255).null())
                    .col(ColumnDef::new(Accounts::City).string_len(128).null())
                    .col(ColumnDef::new(Accounts::Country).string_len(128).null())
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::PlanId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Plans::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Plans::Code)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Plans::PriceAmount).double().not_null())
                    .col(
                        ColumnDef::new(Plans::PriceCurrency)
                            .string_len(8)
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Plans::BillingPeriod)
                            .custom(Alias::new("billing_period"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Plans::DownloadMbps).integer().not_null())
                    .col(ColumnDef::new(Plans::UploadMbps).integer().not_null())
                    .col(ColumnDef::new(Plans::DataCapGb).integer().null())
                    .col(
                        ColumnDef::new(Plans::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Plans::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::SubscriptionId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::PlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .custom(Alias::new("subscription_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::subscription_status")),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::AutoRenew)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_user")
                            .from(Subscriptions::Table, Subscriptions::UserId)
                            .to(Accounts::Table, Accounts::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_plan")
                            .from(Subscriptions::Table, Subscriptions::PlanId)
                            .to(Plans::Table, Plans::PlanId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionsHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionsHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransactionsHistory::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(TransactionsHistory::SubscriptionId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TransactionsHistory::Amount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionsHistory::Currency)
                            .string_len(8)
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(TransactionsHistory::EventType)
                            .custom(Alias::new("transaction_event_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionsHistory::Description)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TransactionsHistory::Status)
                            .string_len(32)
                            .not_null()
                            .default("completed"),
                    )
                    .col(
                        ColumnDef::new(TransactionsHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_history_user")
                            .from(TransactionsHistory::Table, TransactionsHistory::UserId)
                            .to(Accounts::Table, Accounts::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::TicketId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::UserId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::Subject).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Tickets::Priority)
                            .custom(Alias::new("ticket_priority"))
                            .not_null()
                            .default(Expr::cust("'normal'::ticket_priority")),
                    )
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .custom(Alias::new("ticket_status"))
                            .not_null()
                            .default(Expr::cust("'open'::ticket_status")),
                    )
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_user")
                            .from(Tickets::Table, Tickets::UserId)
                            .to(Accounts::Table, Accounts::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupportMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportMessages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupportMessages::TicketId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupportMessages::SenderId).uuid().not_null())
                    .col(
                        ColumnDef::new(SupportMessages::SenderRole)
                            .custom(Alias::new("sender_role"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportMessages::MessageText)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupportMessages::Attachments).json_binary().null())
                    .col(
                        ColumnDef::new(SupportMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_messages_ticket")
                            .from(SupportMessages::Table, SupportMessages::TicketId)
                            .to(Tickets::Table, Tickets::TicketId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserUsage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserUsage::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserUsage::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserUsage::SubscriptionId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserUsage::BytesUp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserUsage::BytesDown)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserUsage::RecordedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_usage_user")
                            .from(UserUsage::Table, UserUsage::UserId)
                            .to(Accounts::Table, Accounts::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // indexes
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_user")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_history_user")
                    .table(TransactionsHistory::Table)
                    .col(TransactionsHistory::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_user")
                    .table(Tickets::Table)
                    .col(Tickets::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_support_messages_ticket")
                    .table(SupportMessages::Table)
                    .col(SupportMessages::TicketId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_usage_user")
                    .table(UserUsage::Table)
                    .col(UserUsage::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(UserUsage::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SupportMessages::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(TransactionsHistory::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Subscriptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Accounts::Table).to_owned())
            .await?;

        for name in [
            "sender_role",
            "ticket_priority",
            "ticket_status",
            "transaction_event_type",
            "subscription_status",
            "billing_period",
        ] {
            manager
                .drop_type(Type::drop().name(Alias::new(name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
