use rusqlite::Connection;

use crate::error::KithResult;

/// Initialize the database schema. Creates all tables if they don't exist.
pub fn initialize(conn: &Connection) -> KithResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            bio TEXT,
            location TEXT,
            avatar_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS friends (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            nickname TEXT,
            birthday TEXT,
            how_we_met TEXT,
            notes TEXT,
            location TEXT,
            interests TEXT NOT NULL DEFAULT '[]',
            level TEXT NOT NULL,
            photo_url TEXT,
            instagram TEXT,
            reminder_days INTEGER,
            archived INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS friends_owner ON friends(owner_id);

        CREATE TABLE IF NOT EXISTS contact_entries (
            id TEXT PRIMARY KEY NOT NULL,
            friend_id TEXT NOT NULL REFERENCES friends(id) ON DELETE CASCADE,
            contact_type TEXT NOT NULL,
            string_value TEXT,
            street TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            country TEXT,
            label TEXT,
            position INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            archived INTEGER NOT NULL DEFAULT 0,
            UNIQUE(owner_id, name COLLATE NOCASE)
        );

        CREATE TABLE IF NOT EXISTS friend_categories (
            friend_id TEXT NOT NULL REFERENCES friends(id) ON DELETE CASCADE,
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            PRIMARY KEY (friend_id, category_id)
        );

        CREATE TABLE IF NOT EXISTS relationships (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            from_friend_id TEXT NOT NULL REFERENCES friends(id) ON DELETE CASCADE,
            to_friend_id TEXT NOT NULL REFERENCES friends(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            note TEXT,
            created_at TEXT NOT NULL,
            UNIQUE(from_friend_id, to_friend_id, kind)
        );

        CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            friend_id TEXT REFERENCES friends(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT,
            occurred_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS activities_owner_time ON activities(owner_id, occurred_at);
        CREATE INDEX IF NOT EXISTS activities_friend_time ON activities(friend_id, occurred_at);

        CREATE TABLE IF NOT EXISTS activity_topics (
            activity_id TEXT NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
            topic TEXT NOT NULL,
            PRIMARY KEY (activity_id, topic)
        );

        CREATE TABLE IF NOT EXISTS contact_shares (
            id TEXT PRIMARY KEY NOT NULL,
            sender_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            recipient_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            card TEXT NOT NULL,
            message TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            responded_at TEXT
        );
        ",
    )?;
    Ok(())
}

/// Create an in-memory connection for testing.
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}
