mod common;

use common::*;
use monthly_coffee_backend::AppError;
use monthly_coffee_backend::entities::{
    expense_entity as expenses, expense_image_entity as expense_images,
};
use monthly_coffee_backend::models::{
    CreateExpenseRequest, CreatePostRequest, ExpensePatch, UploadedFile,
};
use monthly_coffee_backend::services::{ExpenseService, PostService};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

fn create_request(price: i32) -> CreateExpenseRequest {
    CreateExpenseRequest {
        category: "coffee".to_string(),
        brand: "Blue Bottle".to_string(),
        price,
        memo: None,
        tumbler: true,
        taste: Some("nutty".to_string()),
        mood: None,
        bean: Some("Ethiopia".to_string()),
        like_hate: Some(1),
        payment: Some("card".to_string()),
        date: ymd(2025, 5, 14),
    }
}

fn file(name: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile {
        original_filename: name.to_string(),
        bytes: bytes.to_vec(),
    }
}

#[tokio::test]
async fn test_put_expense_stores_images() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let service = ExpenseService::new(db.clone(), dir.path());

    let response = service
        .put_expense(
            vec![file("latte.png", b"png-bytes"), file("receipt.jpg", b"jpg-bytes")],
            create_request(5200),
            m1.id,
        )
        .await
        .unwrap();

    assert_eq!(response.message, "登记成功");
    assert_eq!(response.images.len(), 2);
    assert!(response.images.iter().all(|r| r.is_success()));

    let first = &response.images[0];
    let stored = first.stored_filename.as_deref().unwrap();
    assert!(stored.starts_with("coffee_") && stored.ends_with(".png"));
    assert_eq!(std::fs::read(dir.path().join(stored)).unwrap(), b"png-bytes");

    let list = service.get_expenses(m1.id, None).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].price, 5200);
    assert!(list[0].tumbler);
    assert_eq!(list[0].images.len(), 2);
    assert_eq!(list[0].images[0].original_filename, "latte");
    assert_eq!(list[0].images[0].url, format!("/api/v1/images/{stored}"));
}

#[tokio::test]
async fn test_failed_upload_keeps_expense_and_reports_each_file() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let service = ExpenseService::new(db.clone(), dir.path().join("missing"));

    let response = service
        .put_expense(
            vec![file("a.png", b"a"), file("b.png", b"b")],
            create_request(3000),
            m1.id,
        )
        .await
        .unwrap();

    assert_eq!(response.images.len(), 2);
    for result in &response.images {
        assert!(!result.is_success());
        assert!(result.image_id.is_none());
        assert!(result.error.is_some());
    }
    assert_eq!(response.images[0].original_filename, "a.png");

    let stored = expenses::Entity::find_by_id(response.id).one(&db).await.unwrap();
    assert!(stored.is_some());
    assert_eq!(expense_images::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_put_expense_validation() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let service = ExpenseService::new(db.clone(), dir.path());

    let mut request = create_request(-1);
    let err = service.put_expense(vec![], request.clone(), m1.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    request.price = 100;
    request.brand = "  ".to_string();
    let err = service.put_expense(vec![], request, m1.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .put_expense(vec![], create_request(100), 404)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_expense_is_sparse() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let original = insert_expense(&db, m1.id, 4500, ymd(2025, 5, 1)).await;
    let service = ExpenseService::new(db.clone(), dir.path());

    let confirmation = service
        .update(original.id, ExpensePatch::default())
        .await
        .unwrap();
    assert_eq!(confirmation.message, "修改成功");
    let unchanged = expenses::Entity::find_by_id(original.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, original);

    let patch = ExpensePatch {
        price: Some(6100),
        ..Default::default()
    };
    service.update(original.id, patch).await.unwrap();
    let updated = expenses::Entity::find_by_id(original.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.price, 6100);
    assert_eq!(
        expenses::Model {
            price: original.price,
            ..updated
        },
        original
    );

    let err = service
        .update(999, ExpensePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_get_expenses_filters_by_month() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let m2 = insert_member(&db, "m2").await;
    insert_expense(&db, m1.id, 1000, ymd(2025, 4, 30)).await;
    insert_expense(&db, m1.id, 2000, ymd(2025, 5, 1)).await;
    insert_expense(&db, m1.id, 3000, ymd(2025, 5, 31)).await;
    insert_expense(&db, m1.id, 4000, ymd(2025, 6, 1)).await;
    insert_expense(&db, m2.id, 9000, ymd(2025, 5, 10)).await;
    let service = ExpenseService::new(db.clone(), dir.path());

    let may = service.get_expenses(m1.id, Some(202505)).await.unwrap();
    let prices: Vec<i32> = may.iter().map(|e| e.price).collect();
    assert_eq!(prices, vec![3000, 2000]);

    assert_eq!(service.get_expenses(m1.id, None).await.unwrap().len(), 4);

    let err = service.get_expenses(m1.id, Some(202513)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_delete_expense_detaches_images() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let service = ExpenseService::new(db.clone(), dir.path());

    let created = service
        .put_expense(vec![file("a.png", b"a")], create_request(3000), m1.id)
        .await
        .unwrap();
    let image_id = created.images[0].image_id.unwrap();

    let confirmation = service.delete(created.id).await.unwrap();
    assert_eq!(confirmation.message, "删除成功");
    assert!(expenses::Entity::find_by_id(created.id).one(&db).await.unwrap().is_none());

    let image = expense_images::Entity::find_by_id(image_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(image.expense_id, None);

    service.delete_image(image_id).await.unwrap();
    let err = service.delete_image(image_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_published_expense_is_rejected() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let expense = insert_expense(&db, m1.id, 4500, ymd(2025, 5, 1)).await;
    let service = ExpenseService::new(db.clone(), dir.path());
    PostService::new(db.clone(), jwt_service())
        .create(
            CreatePostRequest {
                expense_id: expense.id,
                content: "hi".to_string(),
            },
            m1.id,
        )
        .await
        .unwrap();

    let err = service.delete(expense.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(expenses::Entity::find_by_id(expense.id).one(&db).await.unwrap().is_some());
}

#[tokio::test]
async fn test_get_image_reads_upload_dir() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("coffee_1.png"), b"img").unwrap();
    let service = ExpenseService::new(db.clone(), dir.path());

    let image = service.get_image("coffee_1.png").await.unwrap();
    assert_eq!(image.bytes, b"img");
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.content_disposition, "attachment; filename*=\"coffee_1.png\"");

    let err = service.get_image("coffee_2.png").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = service.get_image("../secret.png").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_monthly_totals_ranked() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    insert_expense(&db, m1.id, 4500, ymd(2025, 5, 1)).await;
    insert_expense(&db, m1.id, 3000, ymd(2025, 5, 20)).await;
    insert_expense(&db, m1.id, 7500, ymd(2025, 4, 2)).await;
    insert_expense(&db, m1.id, 2000, ymd(2025, 3, 9)).await;
    let service = ExpenseService::new(db.clone(), dir.path());

    let totals = service.monthly_totals(m1.id).await.unwrap();
    let view: Vec<(&str, i64, u32)> = totals
        .iter()
        .map(|t| (t.year_month.as_str(), t.total, t.rank))
        .collect();
    assert_eq!(
        view,
        vec![("2025-05", 7500, 1), ("2025-04", 7500, 1), ("2025-03", 2000, 2)]
    );
}

#[tokio::test]
async fn test_failed_image_row_removes_written_file() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let service = ExpenseService::new(db.clone(), dir.path());

    // 文件写入成功，但元数据行无法插入
    db.execute_unprepared("DROP TABLE expense_images")
        .await
        .unwrap();

    let response = service
        .put_expense(vec![file("a.png", b"a")], create_request(3000), m1.id)
        .await
        .unwrap();

    assert_eq!(response.images.len(), 1);
    assert!(!response.images[0].is_success());
    assert!(expenses::Entity::find_by_id(response.id).one(&db).await.unwrap().is_some());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_delete_racing_publish_never_fails_with_database_error() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let m1 = insert_member(&db, "m1").await;
    let expense = insert_expense(&db, m1.id, 4500, ymd(2025, 5, 1)).await;
    let service = ExpenseService::new(db.clone(), dir.path());
    let posts = PostService::new(db.clone(), jwt_service());
    let request = CreatePostRequest {
        expense_id: expense.id,
        content: "hi".to_string(),
    };

    let (deleted, published) = tokio::join!(
        service.delete(expense.id),
        posts.create(request, m1.id)
    );

    // 无论谁先完成，另一方都只能得到业务错误
    match (deleted, published) {
        (Ok(_), Err(err)) => assert!(matches!(err, AppError::NotFound(_)), "got {err:?}"),
        (Err(err), Ok(_)) => {
            assert!(matches!(err, AppError::ValidationError(_)), "got {err:?}")
        }
        other => panic!("exactly one side should win, got {other:?}"),
    }
}
