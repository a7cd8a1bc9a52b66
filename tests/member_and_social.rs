mod common;

use common::*;
use monthly_coffee_backend::AppError;
use monthly_coffee_backend::entities::Gender;
use monthly_coffee_backend::models::{
    CommentRequest, CreatePostRequest, LoginRequest, MemberPatch, PaginationParams,
};
use monthly_coffee_backend::services::{
    AuthService, CommentService, LoveService, MemberService, PostService,
};

fn login_request(uid: &str, nickname: Option<&str>) -> LoginRequest {
    LoginRequest {
        uid: uid.to_string(),
        nickname: nickname.map(str::to_string),
        birth: Some(ymd(1995, 3, 14)),
        gender: Some(Gender::Female),
    }
}

#[tokio::test]
async fn test_login_registers_then_reuses_member() {
    let db = setup_db().await;
    let jwt = jwt_service();
    let auth = AuthService::new(db.clone(), jwt.clone());

    let err = auth.login(login_request("kakao_1", None)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let first = auth
        .login(login_request("kakao_1", Some("라떼")))
        .await
        .unwrap();
    assert_eq!(first.token_type, "Bearer");
    assert_eq!(first.expires_in, 3600);
    assert_eq!(first.member.nickname, "라떼");
    assert_eq!(first.member.gender, Some(Gender::Female));

    let claims = jwt.verify_access_token(&first.access_token).unwrap();
    assert_eq!(claims.member_id().unwrap(), first.member.id);

    // 已注册会员再次登录时忽略资料字段
    let second = auth
        .login(login_request("kakao_1", Some("모카")))
        .await
        .unwrap();
    assert_eq!(second.member.id, first.member.id);
    assert_eq!(second.member.nickname, "라떼");
}

#[tokio::test]
async fn test_refresh_token() {
    let db = setup_db().await;
    let auth = AuthService::new(db.clone(), jwt_service());
    let login = auth
        .login(login_request("kakao_2", Some("아메리카노")))
        .await
        .unwrap();

    let refreshed = auth.refresh(&login.refresh_token).await.unwrap();
    assert_eq!(refreshed.member.id, login.member.id);

    let err = auth.refresh(&login.access_token).await.unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));
    let err = auth.refresh("not-a-token").await.unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));

    let stranger = jwt_service().generate_refresh_token(999, "ghost").unwrap();
    let err = auth.refresh(&stranger).await.unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));
}

#[tokio::test]
async fn test_update_member_is_sparse() {
    let db = setup_db().await;
    let m1 = insert_member(&db, "m1").await;
    let service = MemberService::new(db.clone());

    let updated = service
        .update_member(
            m1.id,
            MemberPatch {
                gender: Some(Gender::Male),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.gender, Some(Gender::Male));
    assert_eq!(updated.nickname, m1.nickname);
    assert_eq!(updated.birth, None);

    let err = service
        .update_member(
            m1.id,
            MemberPatch {
                nickname: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service.get_member(999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

async fn published_post(db: &sea_orm::DatabaseConnection, owner_id: i64) -> i64 {
    let expense = insert_expense(db, owner_id, 4500, ymd(2025, 5, 1)).await;
    PostService::new(db.clone(), jwt_service())
        .create(
            CreatePostRequest {
                expense_id: expense.id,
                content: "hi".to_string(),
            },
            owner_id,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_love_once_per_member() {
    let db = setup_db().await;
    let m1 = insert_member(&db, "m1").await;
    let m2 = insert_member(&db, "m2").await;
    let post_id = published_post(&db, m1.id).await;
    let loves = LoveService::new(db.clone());

    let loved = loves.love(post_id, m2.id).await.unwrap();
    assert!(loved.loved);
    assert_eq!(loved.love_count, 1);

    let err = loves.love(post_id, m2.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let loved = loves.love(post_id, m1.id).await.unwrap();
    assert_eq!(loved.love_count, 2);

    let unloved = loves.unlove(post_id, m2.id).await.unwrap();
    assert!(!unloved.loved);
    assert_eq!(unloved.love_count, 1);
    let err = loves.unlove(post_id, m2.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = loves.love(999, m2.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_comments_by_writer_only() {
    let db = setup_db().await;
    let m1 = insert_member(&db, "m1").await;
    let m2 = insert_member(&db, "m2").await;
    let post_id = published_post(&db, m1.id).await;
    let comments = CommentService::new(db.clone());
    let content = |s: &str| CommentRequest {
        content: s.to_string(),
    };

    let first = comments.create(post_id, m2.id, content("first")).await.unwrap();
    comments.create(post_id, m1.id, content("second")).await.unwrap();
    assert_eq!(first.member_id, m2.id);

    let err = comments.create(post_id, m2.id, content(" ")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    let err = comments.create(999, m2.id, content("lost")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = comments
        .modify(first.id, m1.id, content("not yours"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    let edited = comments
        .modify(first.id, m2.id, content("edited"))
        .await
        .unwrap();
    assert_eq!(edited.content, "edited");

    let page = comments
        .list(post_id, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].content, "edited");
    assert_eq!(page.items[1].content, "second");

    let err = comments.delete(first.id, m1.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    comments.delete(first.id, m2.id).await.unwrap();
    let page = comments
        .list(post_id, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}
