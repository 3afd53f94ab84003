// handlers/protected/friends.rs - friendships and friend requests
//
// Friendships are stored as two rows, one per direction, so every lookup
// only ever filters on `user_id`.

use axum::Extension;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgConnection};

use crate::auth::{looks_like_email, normalize_email};
use crate::database::models::{Friend, FriendRequest, IncomingFriendRequest, UserSummary};
use crate::database::DbConn;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, ValidJson, ValidPath};
use crate::types::FriendRequestStatus;

const REQUEST_COLUMNS: &str = "id, sender_id, receiver_id, status, created_at, responded_at";

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    /// New pending request waiting on the receiver
    Sent { request: FriendRequest },
    /// The receiver had already asked us; both are now friends
    Accepted { request: FriendRequest, friend: UserSummary },
}

#[derive(Debug, Serialize)]
pub struct Removed {
    pub friend_id: i64,
    pub removed: bool,
}

async fn insert_friendship(conn: &mut PgConnection, a: i64, b: i64) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO friendships (user_id, friend_id)
        VALUES ($1, $2), ($2, $1)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(a)
    .bind(b)
    .execute(conn)
    .await?;
    Ok(())
}

async fn are_friends(conn: &mut PgConnection, a: i64, b: i64) -> Result<bool, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT friend_id FROM friendships WHERE user_id = $1 AND friend_id = $2")
        .bind(a)
        .bind(b)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

async fn pending_between(
    conn: &mut PgConnection,
    sender_id: i64,
    receiver_id: i64,
) -> Result<Option<FriendRequest>, ApiError> {
    let sql = format!(
        "SELECT {} FROM friend_requests WHERE sender_id = $1 AND receiver_id = $2 AND status = 'pending' FOR UPDATE",
        REQUEST_COLUMNS
    );
    Ok(sqlx::query_as::<_, FriendRequest>(&sql)
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(conn)
        .await?)
}

async fn respond(
    conn: &mut PgConnection,
    request_id: i64,
    status: FriendRequestStatus,
) -> Result<FriendRequest, ApiError> {
    let sql = format!(
        "UPDATE friend_requests SET status = $2, responded_at = NOW() WHERE id = $1 RETURNING {}",
        REQUEST_COLUMNS
    );
    Ok(sqlx::query_as::<_, FriendRequest>(&sql)
        .bind(request_id)
        .bind(status.as_str())
        .fetch_one(conn)
        .await?)
}

/// GET /api/friends
pub async fn friends_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<Friend>> {
    let friends = sqlx::query_as::<_, Friend>(
        r#"
        SELECT u.id, u.name, u.email,
               COALESCE(s.current_streak, 0) AS current_streak,
               f.created_at AS since
        FROM friendships f
        JOIN users u ON u.id = f.friend_id
        LEFT JOIN streaks s ON s.user_id = u.id
        WHERE f.user_id = $1
        ORDER BY u.name, u.id
        "#,
    )
    .bind(user.id)
    .fetch_all(&mut conn)
    .await?;

    Ok(ApiResponse::success(friends))
}

/// DELETE /api/friends/:id - removes both directions
pub async fn friend_delete(
    Extension(user): Extension<CurrentUser>,
    ValidPath(friend_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Removed> {
    let result = sqlx::query(
        r#"
        DELETE FROM friendships
        WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)
        "#,
    )
    .bind(user.id)
    .bind(friend_id)
    .execute(&mut conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("User {} is not in your friends list", friend_id)));
    }

    tracing::info!("User {} removed friend {}", user.id, friend_id);
    Ok(ApiResponse::success(Removed { friend_id, removed: true }))
}

/// GET /api/friends/requests - pending requests sent to the current user
pub async fn requests_get(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
) -> ApiResult<Vec<IncomingFriendRequest>> {
    let requests = sqlx::query_as::<_, IncomingFriendRequest>(
        r#"
        SELECT r.id, r.sender_id, u.name AS sender_name, u.email AS sender_email, r.created_at
        FROM friend_requests r
        JOIN users u ON u.id = r.sender_id
        WHERE r.receiver_id = $1 AND r.status = 'pending'
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&mut conn)
    .await?;

    Ok(ApiResponse::success(requests))
}

/// POST /api/friends/requests - send a request by email
pub async fn request_post(
    Extension(user): Extension<CurrentUser>,
    DbConn(mut conn): DbConn,
    ValidJson(payload): ValidJson<SendRequest>,
) -> ApiResult<SendOutcome> {
    if !looks_like_email(&payload.email) {
        return Err(ApiError::invalid_field("email", "Must be a valid email address"));
    }
    let email = normalize_email(&payload.email);
    if email == normalize_email(&user.email) {
        return Err(ApiError::bad_request("You cannot send a friend request to yourself"));
    }

    let mut tx = conn.begin().await?;

    let receiver = sqlx::query_as::<_, UserSummary>("SELECT id, name, email FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user registered with email {}", email)))?;

    if are_friends(&mut tx, user.id, receiver.id).await? {
        return Err(ApiError::conflict("You are already friends"));
    }
    if pending_between(&mut tx, user.id, receiver.id).await?.is_some() {
        return Err(ApiError::conflict("A friend request is already pending"));
    }

    let outcome = match pending_between(&mut tx, receiver.id, user.id).await? {
        Some(reverse) => {
            let request = respond(&mut tx, reverse.id, FriendRequestStatus::Accepted).await?;
            insert_friendship(&mut tx, user.id, receiver.id).await?;
            tracing::info!("Users {} and {} are now friends (reverse request {})", user.id, receiver.id, request.id);
            SendOutcome::Accepted { request, friend: receiver }
        }
        None => {
            let sql = format!(
                "INSERT INTO friend_requests (sender_id, receiver_id) VALUES ($1, $2) RETURNING {}",
                REQUEST_COLUMNS
            );
            let request = sqlx::query_as::<_, FriendRequest>(&sql)
                .bind(user.id)
                .bind(receiver.id)
                .fetch_one(&mut *tx)
                .await?;
            tracing::info!("User {} sent friend request {} to {}", user.id, request.id, receiver.id);
            SendOutcome::Sent { request }
        }
    };

    tx.commit().await?;
    Ok(ApiResponse::created(outcome))
}

/// Lock the request and check it can be answered by `user_id`
async fn answerable_request(conn: &mut PgConnection, request_id: i64, user_id: i64) -> Result<FriendRequest, ApiError> {
    let sql = format!("SELECT {} FROM friend_requests WHERE id = $1 FOR UPDATE", REQUEST_COLUMNS);
    let request = sqlx::query_as::<_, FriendRequest>(&sql)
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Friend request {} not found", request_id)))?;

    if request.receiver_id != user_id {
        return Err(ApiError::forbidden("Only the receiver can respond to a friend request"));
    }
    if request.status != FriendRequestStatus::Pending.as_str() {
        return Err(ApiError::conflict(format!("Friend request is already {}", request.status)));
    }
    Ok(request)
}

/// POST /api/friends/requests/:id/accept
pub async fn request_accept_post(
    Extension(user): Extension<CurrentUser>,
    ValidPath(request_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<FriendRequest> {
    let mut tx = conn.begin().await?;
    let request = answerable_request(&mut tx, request_id, user.id).await?;
    let request = respond(&mut tx, request.id, FriendRequestStatus::Accepted).await?;
    insert_friendship(&mut tx, request.sender_id, request.receiver_id).await?;
    tx.commit().await?;

    tracing::info!("User {} accepted friend request {}", user.id, request.id);
    Ok(ApiResponse::success(request))
}

/// POST /api/friends/requests/:id/reject
pub async fn request_reject_post(
    Extension(user): Extension<CurrentUser>,
    ValidPath(request_id): ValidPath<i64>,
    DbConn(mut conn): DbConn,
) -> ApiResult<FriendRequest> {
    let mut tx = conn.begin().await?;
    let request = answerable_request(&mut tx, request_id, user.id).await?;
    let request = respond(&mut tx, request.id, FriendRequestStatus::Rejected).await?;
    tx.commit().await?;

    Ok(ApiResponse::success(request))
}
