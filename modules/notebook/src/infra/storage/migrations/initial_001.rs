use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum AppUser {
    Table,
    Id,
    Login,
}

#[derive(DeriveIden)]
enum NoteBook {
    Table,
    Id,
    Name,
    Handle,
    UserId,
}

#[derive(DeriveIden)]
enum Note {
    Table,
    Id,
    Title,
    Content,
    Date,
    UserId,
    NotebookId,
}

#[derive(DeriveIden)]
enum Share {
    Table,
    Id,
    Invite,
    AuthorId,
    WithUserId,
    SharingId,
}

fn pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

/// Nullable reference column; the referenced row may be deleted, which clears it.
fn reference<F, T>(name: &str, from: (F, F), to: T) -> ForeignKeyCreateStatement
where
    F: IntoIden + 'static,
    T: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to, Alias::new("id"))
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(pk(AppUser::Id))
                    .col(ColumnDef::new(AppUser::Login).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NoteBook::Table)
                    .if_not_exists()
                    .col(pk(NoteBook::Id))
                    .col(ColumnDef::new(NoteBook::Name).string().not_null())
                    .col(ColumnDef::new(NoteBook::Handle).string().not_null())
                    .col(ColumnDef::new(NoteBook::UserId).big_integer().null())
                    .foreign_key(&mut reference(
                        "fk_note_book_user",
                        (NoteBook::Table, NoteBook::UserId),
                        AppUser::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Note::Table)
                    .if_not_exists()
                    .col(pk(Note::Id))
                    .col(ColumnDef::new(Note::Title).string().not_null())
                    .col(ColumnDef::new(Note::Content).text().not_null())
                    .col(ColumnDef::new(Note::Date).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Note::UserId).big_integer().null())
                    .col(ColumnDef::new(Note::NotebookId).big_integer().null())
                    .foreign_key(&mut reference(
                        "fk_note_user",
                        (Note::Table, Note::UserId),
                        AppUser::Table,
                    ))
                    .foreign_key(&mut reference(
                        "fk_note_notebook",
                        (Note::Table, Note::NotebookId),
                        NoteBook::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Share::Table)
                    .if_not_exists()
                    .col(pk(Share::Id))
                    .col(ColumnDef::new(Share::Invite).string().not_null())
                    .col(ColumnDef::new(Share::AuthorId).big_integer().null())
                    .col(ColumnDef::new(Share::WithUserId).big_integer().null())
                    .col(ColumnDef::new(Share::SharingId).big_integer().null())
                    .foreign_key(&mut reference(
                        "fk_share_author",
                        (Share::Table, Share::AuthorId),
                        AppUser::Table,
                    ))
                    .foreign_key(&mut reference(
                        "fk_share_with_user",
                        (Share::Table, Share::WithUserId),
                        AppUser::Table,
                    ))
                    .foreign_key(&mut reference(
                        "fk_share_sharing",
                        (Share::Table, Share::SharingId),
                        Note::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Share::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Note::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NoteBook::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppUser::Table).to_owned())
            .await?;
        Ok(())
    }
}
