use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'author',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create star_balances table (one row per user)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS star_balances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,
            balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
            total_earned INTEGER NOT NULL DEFAULT 0,
            total_spent INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Create star_transactions table (append-only ledger)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS star_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            transaction_type TEXT NOT NULL,
            reason TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_star_transactions_user ON star_transactions(user_id, created_at)",
    )
    .await?;

    // Create books table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            asin TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'English',
            genre TEXT NOT NULL DEFAULT 'other_low_content',
            preferred_marketplace TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            owner_id INTEGER NOT NULL,
            reading_type TEXT,
            cover_image TEXT,
            book_file TEXT,
            book_price REAL NOT NULL,
            print_book_link TEXT,
            print_book_price REAL,
            goodreads_link TEXT,
            add_goodreads_review BOOLEAN NOT NULL DEFAULT 0,
            add_photo_review BOOLEAN NOT NULL DEFAULT 0,
            add_video_review BOOLEAN NOT NULL DEFAULT 0,
            stars_cost INTEGER NOT NULL DEFAULT 0,
            review_requested_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_books_status ON books(status)",
    )
    .await?;

    // Create book_assignments table; one assignment per (book, reader)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS book_assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL,
            reader_id INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'assigned',
            assigned_at TEXT NOT NULL,
            started_reading_at TEXT,
            completed_at TEXT,
            review_link TEXT,
            stars_reward INTEGER NOT NULL DEFAULT 100,
            pages_read INTEGER NOT NULL DEFAULT 0,
            total_pages INTEGER NOT NULL DEFAULT 0,
            UNIQUE (book_id, reader_id),
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (reader_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Create submission_drafts table (server-side wizard state)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS submission_drafts (
            id TEXT PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            data TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    Ok(())
}
