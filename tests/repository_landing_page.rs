mod common;

use campaign_builder::domain::entities::NewLandingPage;
use campaign_builder::domain::repositories::LandingPageRepository;
use campaign_builder::infrastructure::persistence::PgLandingPageRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_page(campaign: &str, url: &str) -> NewLandingPage {
    NewLandingPage {
        account_id: "acct-1".to_string(),
        user_id: "user-1".to_string(),
        campaign_name: campaign.to_string(),
        url: url.to_string(),
        label: "Shop".to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_is_idempotent(pool: PgPool) {
    let repo = PgLandingPageRepository::new(Arc::new(pool.clone()));

    let first = repo.create(new_page("spring", "https://a.com/")).await.unwrap();
    let again = repo.create(new_page("spring", "https://a.com/")).await.unwrap();
    assert_eq!(first.id, again.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM landing_pages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_known_urls_in_insertion_order(pool: PgPool) {
    let repo = PgLandingPageRepository::new(Arc::new(pool));

    repo.create(new_page("spring", "https://a.com/")).await.unwrap();
    repo.create(new_page("spring", "https://b.com/")).await.unwrap();
    repo.create(new_page("summer", "https://a.com/")).await.unwrap();

    let urls = repo.known_urls("acct-1").await.unwrap();
    assert_eq!(urls, ["https://a.com/", "https://b.com/", "https://a.com/"]);
    assert!(repo.known_urls("acct-2").await.unwrap().is_empty());
}
