#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use migration::MigratorTrait;
use monthly_coffee_backend::entities::{expense_entity as expenses, member_entity as members};
use monthly_coffee_backend::utils::JwtService;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

pub const TEST_SECRET: &str = "test-secret";

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub fn jwt_service() -> JwtService {
    JwtService::new(TEST_SECRET, 3600, 86400)
}

pub async fn insert_member(db: &DatabaseConnection, uid: &str) -> members::Model {
    members::ActiveModel {
        uid: Set(uid.to_string()),
        nickname: Set(format!("nick_{uid}")),
        birth: Set(None),
        gender: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_expense(
    db: &DatabaseConnection,
    member_id: i64,
    price: i32,
    date: NaiveDate,
) -> expenses::Model {
    expenses::ActiveModel {
        member_id: Set(member_id),
        category: Set("coffee".to_string()),
        brand: Set("Starbucks".to_string()),
        price: Set(price),
        memo: Set(Some("iced".to_string())),
        tumbler: Set(false),
        taste: Set(None),
        mood: Set(None),
        bean: Set(None),
        like_hate: Set(Some(1)),
        payment: Set(Some("card".to_string())),
        date: Set(date),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
