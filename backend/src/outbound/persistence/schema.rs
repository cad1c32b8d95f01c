//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the SQL in `migrations/` exactly. No
//! foreign keys reference the join tables: cascades are application
//! driven and best-effort, and readers tolerate orphaned join rows.

diesel::table! {
    /// Registered accounts, including the current renewal credential.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        full_name -> Varchar,
        password_hash -> Varchar,
        avatar_url -> Varchar,
        cover_image_url -> Nullable<Varchar>,
        refresh_token -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded videos.
    videos (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        description -> Text,
        video_url -> Varchar,
        thumbnail_url -> Varchar,
        duration_secs -> Float8,
        views -> Int8,
        is_published -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments attached to videos.
    comments (id) {
        id -> Uuid,
        video_id -> Uuid,
        owner_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Like join rows. The tagged target is stored as (kind, id); a
    /// unique index over (liked_by, target_kind, target_id) enforces the
    /// at-most-one invariant.
    likes (id) {
        id -> Uuid,
        liked_by -> Uuid,
        target_kind -> Varchar,
        target_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Subscription join rows; unique over (subscriber_id, channel_id).
    subscriptions (id) {
        id -> Uuid,
        subscriber_id -> Uuid,
        channel_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Playlists; membership lives in `playlist_videos`.
    playlists (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        description -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Playlist membership rows; the composite key gives set semantics.
    playlist_videos (playlist_id, video_id) {
        playlist_id -> Uuid,
        video_id -> Uuid,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tweets.
    tweets (id) {
        id -> Uuid,
        owner_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Watch history rows; the composite key gives set semantics.
    watch_history (user_id, video_id) {
        user_id -> Uuid,
        video_id -> Uuid,
        watched_at -> Timestamptz,
    }
}
