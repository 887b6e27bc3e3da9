use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_products_tables::Migration),
            Box::new(m20240601_000002_create_carts_tables::Migration),
            Box::new(m20240601_000003_create_orders_tables::Migration),
            Box::new(m20240601_000004_create_tour_registrations_table::Migration),
            Box::new(m20240601_000005_create_tour_slot_occupancies_table::Migration),
            Box::new(m20240601_000006_create_about_contents_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_products_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_products_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create products table aligned with entities::product Model
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Slug).string().not_null())
                        .col(ColumnDef::new(Products::Summary).string().null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CompareAtPrice).decimal().null())
                        .col(
                            ColumnDef::new(Products::InventoryCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::IsFeatured)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Products::Status).string().not_null())
                        .col(ColumnDef::new(Products::Metadata).json().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_slug")
                        .table(Products::Table)
                        .col(Products::Slug)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_status")
                        .table(Products::Table)
                        .col(Products::Status)
                        .to_owned(),
                )
                .await?;

            // Create product_images table aligned with entities::product_image Model
            manager
                .create_table(
                    Table::create()
                        .table(ProductImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductImages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ProductImages::Url).string().not_null())
                        .col(ColumnDef::new(ProductImages::AltText).string().null())
                        .col(
                            ColumnDef::new(ProductImages::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductImages::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_images_product_id")
                        .table(ProductImages::Table)
                        .col(ProductImages::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductImages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Sku,
        Name,
        Slug,
        Summary,
        Description,
        Price,
        CompareAtPrice,
        InventoryCount,
        IsFeatured,
        Status,
        Metadata,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ProductImages {
        Table,
        Id,
        ProductId,
        Url,
        AltText,
        SortOrder,
        CreatedAt,
    }
}

mod m20240601_000002_create_carts_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_carts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create carts table aligned with entities::cart Model
            manager
                .create_table(
                    Table::create()
                        .table(Carts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Carts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Carts::Token).string().not_null())
                        .col(ColumnDef::new(Carts::Email).string().null())
                        .col(ColumnDef::new(Carts::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Carts::ItemsCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Carts::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Carts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Carts::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_carts_token")
                        .table(Carts::Table)
                        .col(Carts::Token)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Create cart_items table aligned with entities::cart_item Model
            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CartItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CartItems::CartId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(CartItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(CartItems::LineTotal).decimal().not_null())
                        .col(ColumnDef::new(CartItems::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(CartItems::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cart_items_cart_id")
                        .table(CartItems::Table)
                        .col(CartItems::CartId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cart_items_product_id")
                        .table(CartItems::Table)
                        .col(CartItems::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Carts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Carts {
        Table,
        Id,
        Token,
        Email,
        Currency,
        ItemsCount,
        Subtotal,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum CartItems {
        Table,
        Id,
        CartId,
        ProductId,
        Quantity,
        UnitPrice,
        LineTotal,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_orders_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create orders table aligned with entities::order Model
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::CartToken).string().null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string().not_null())
                        .col(ColumnDef::new(Orders::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Orders::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TaxTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippingTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::GrandTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                        .col(ColumnDef::new(Orders::Email).string().not_null())
                        .col(ColumnDef::new(Orders::Phone).string().null())
                        .col(ColumnDef::new(Orders::CountryCode).string().null())
                        .col(ColumnDef::new(Orders::AddressLine1).string().not_null())
                        .col(ColumnDef::new(Orders::AddressLine2).string().null())
                        .col(ColumnDef::new(Orders::City).string().not_null())
                        .col(ColumnDef::new(Orders::State).string().null())
                        .col(ColumnDef::new(Orders::PostalCode).string().not_null())
                        .col(ColumnDef::new(Orders::Notes).json().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_number")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            // Create order_items table aligned with entities::order_item Model
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductName).string().not_null())
                        .col(ColumnDef::new(OrderItems::Sku).string().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::LineTotal).decimal().not_null())
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_product_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        OrderNumber,
        CartToken,
        Status,
        PaymentStatus,
        Currency,
        Subtotal,
        TaxTotal,
        ShippingTotal,
        GrandTotal,
        CustomerName,
        Email,
        Phone,
        CountryCode,
        AddressLine1,
        AddressLine2,
        City,
        State,
        PostalCode,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        ProductName,
        Sku,
        Quantity,
        UnitPrice,
        LineTotal,
        CreatedAt,
    }
}

mod m20240601_000004_create_tour_registrations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_tour_registrations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create tour_registrations table aligned with entities::tour_registration Model
            manager
                .create_table(
                    Table::create()
                        .table(TourRegistrations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TourRegistrations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::ContactName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TourRegistrations::Email).string().not_null())
                        .col(ColumnDef::new(TourRegistrations::Phone).string().null())
                        .col(
                            ColumnDef::new(TourRegistrations::CountryCode)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::Organisation)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::GroupType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::PreferredDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::PreferredSlot)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::AdultsCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::StudentsCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::NeedsGuidedTour)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(TourRegistrations::Notes).text().null())
                        .col(
                            ColumnDef::new(TourRegistrations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourRegistrations::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Capacity lookups always filter on (date, slot)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tour_registrations_date_slot")
                        .table(TourRegistrations::Table)
                        .col(TourRegistrations::PreferredDate)
                        .col(TourRegistrations::PreferredSlot)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TourRegistrations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TourRegistrations {
        Table,
        Id,
        ContactName,
        Email,
        Phone,
        CountryCode,
        Organisation,
        GroupType,
        PreferredDate,
        PreferredSlot,
        AdultsCount,
        StudentsCount,
        NeedsGuidedTour,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_tour_slot_occupancies_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_tour_slot_occupancies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Seat counters aligned with entities::tour_slot_occupancy Model.
            // Registrations increment `booked` through a guarded update keyed
            // on (slot_date, slot_label).
            manager
                .create_table(
                    Table::create()
                        .table(TourSlotOccupancies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TourSlotOccupancies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourSlotOccupancies::SlotDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourSlotOccupancies::SlotLabel)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TourSlotOccupancies::Booked)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tour_slot_occupancies_date_label")
                        .table(TourSlotOccupancies::Table)
                        .col(TourSlotOccupancies::SlotDate)
                        .col(TourSlotOccupancies::SlotLabel)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TourSlotOccupancies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TourSlotOccupancies {
        Table,
        Id,
        SlotDate,
        SlotLabel,
        Booked,
    }
}

mod m20240601_000006_create_about_contents_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_about_contents_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create about_contents table aligned with entities::about_content Model
            manager
                .create_table(
                    Table::create()
                        .table(AboutContents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AboutContents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AboutContents::Title).string().not_null())
                        .col(
                            ColumnDef::new(AboutContents::ParagraphOne)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AboutContents::ParagraphTwo)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AboutContents::ParagraphThree)
                                .text()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AboutContents::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(AboutContents::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AboutContents::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AboutContents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AboutContents {
        Table,
        Id,
        Title,
        ParagraphOne,
        ParagraphTwo,
        ParagraphThree,
        ImageUrl,
        CreatedAt,
        UpdatedAt,
    }
}
