use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use yatube_core::domain::{Follow, Post};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, FollowRepository, PostRepository, Window};

use crate::database::entity::{follow, post};
use crate::database::postgres_repo::{PostgresFollowRepository, PostgresPostRepository};

fn post_model(id: i32, author_id: i32, text: &str) -> post::Model {
    post::Model {
        id,
        text: text.to_owned(),
        created: Utc::now().into(),
        author_id,
        image: None,
        group_id: None,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    // Mock the query expectation
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(7, 3, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(7).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.text, "Test Post");
    assert_eq!(post.id, 7);
    assert_eq!(post.author_id, 3);
}

#[tokio::test]
async fn test_insert_new_post_returns_assigned_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(11, 3, "fresh")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let saved: Post = repo
        .save(Post::new(3, "fresh".into(), None, None))
        .await
        .unwrap();

    assert_eq!(saved.id, 11);
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = BaseRepository::<Post, i32>::delete(&repo, 99).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_list_posts_with_window() {
    let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(5)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row]])
        .append_query_results([vec![post_model(3, 1, "c"), post_model(4, 1, "d")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .list(Some(Window {
            limit: 2,
            offset: 2,
        }))
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(
        page.items.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![3, 4]
    );
}

#[tokio::test]
async fn test_follow_exists() {
    let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(1)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row]])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);

    assert!(repo.exists(1, 2).await.unwrap());
}

#[tokio::test]
async fn test_find_follow_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![follow::Model {
            id: 1,
            user_id: 1,
            following_id: 2,
        }]])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);

    let follow: Option<Follow> = repo.find_by_id(1).await.unwrap();
    assert_eq!(follow.map(|f| (f.user_id, f.following_id)), Some((1, 2)));
}
