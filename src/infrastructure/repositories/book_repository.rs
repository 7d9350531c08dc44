//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use crate::domain::{
    AdminBookFilter, BookRepository, BookStatus, DomainError, LibraryFilter, LibrarySort,
    PaginatedBooks, ADMIN_PAGE_SIZE, LIBRARY_PAGE_SIZE,
};
use crate::models::book::{Column, Entity as BookEntity};
use crate::models::book_assignment;
use crate::models::Book;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Everyone who has taken one of `owner_id`'s books
    async fn readers_of_books_owned_by(&self, owner_id: i32) -> Result<Vec<i32>, DomainError> {
        let readers = book_assignment::Entity::find()
            .select_only()
            .column(book_assignment::Column::ReaderId)
            .join(JoinType::InnerJoin, book_assignment::Relation::Book.def())
            .filter(Column::OwnerId.eq(owner_id))
            .distinct()
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        Ok(readers)
    }

    async fn paginate(
        &self,
        query: Select<BookEntity>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedBooks, DomainError> {
        let paginator = query.paginate(&self.db, per_page);
        let counts = paginator.num_items_and_pages().await?;
        // Pages are 1-based for callers; out-of-range pages clamp to the last one
        let page = page.max(1).min(counts.number_of_pages.max(1));
        let items = paginator.fetch_page(page - 1).await?;

        Ok(PaginatedBooks {
            books: items.into_iter().map(Book::from).collect(),
            total: counts.number_of_items,
            page,
            num_pages: counts.number_of_pages,
        })
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_live(&self, filter: LibraryFilter) -> Result<PaginatedBooks, DomainError> {
        let mut condition = Condition::all().add(Column::Status.eq(BookStatus::Live.as_str()));

        if let Some(reading_type) = filter.reading_type {
            condition = condition.add(Column::ReadingType.eq(reading_type.as_str()));
        }
        if let Some(marketplace) = filter.marketplace {
            condition = condition.add(Column::PreferredMarketplace.eq(marketplace.as_str()));
        }
        if let Some(language) = filter.language {
            condition = condition.add(Column::Language.eq(language.as_str()));
        }
        if let Some(genre) = filter.genre {
            condition = condition.add(Column::Genre.eq(genre.as_str()));
        }
        if let Some(viewer) = filter.viewer {
            let swap_partners = self.readers_of_books_owned_by(viewer).await?;
            condition = condition.add(Column::OwnerId.ne(viewer));
            if !swap_partners.is_empty() {
                condition = condition.add(Column::OwnerId.is_not_in(swap_partners));
            }
        }

        let query = BookEntity::find().filter(condition);
        let query = match filter.sort {
            LibrarySort::CreatedAt => query.order_by_desc(Column::CreatedAt),
            LibrarySort::StarsCost => query
                .order_by_desc(Column::StarsCost)
                .order_by_desc(Column::CreatedAt),
        }
        .order_by_desc(Column::Id);

        self.paginate(query, filter.page, LIBRARY_PAGE_SIZE).await
    }

    async fn find_for_staff(&self, filter: AdminBookFilter) -> Result<PaginatedBooks, DomainError> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(Column::Status.eq(status.as_str()));
        }
        if let Some(genre) = filter.genre {
            condition = condition.add(Column::Genre.eq(genre.as_str()));
        }
        if let Some(language) = filter.language {
            condition = condition.add(Column::Language.eq(language.as_str()));
        }
        if let Some(marketplace) = filter.marketplace {
            condition = condition.add(Column::PreferredMarketplace.eq(marketplace.as_str()));
        }
        if let Some(q) = filter.search.as_deref().map(str::trim)
            && !q.is_empty()
        {
            condition = condition.add(
                Condition::any()
                    .add(Column::Title.contains(q))
                    .add(Column::Author.contains(q)),
            );
        }

        let query = BookEntity::find()
            .filter(condition)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        self.paginate(query, filter.page, ADMIN_PAGE_SIZE).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(Book::from))
    }
}
