//! Database seeder for Scolara development and testing.
//!
//! Seeds a demo school with students, a guardian link, a lump fee, and a
//! split fee with three installments, then prints dev tokens for each role.
//!
//! Usage: cargo run --bin seeder

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use scolara_db::entities::{fee_schedules, guardian_links, schools, students};
use scolara_shared::{JwtConfig, JwtService, Role, types::money::format_cents};

/// Demo school ID (consistent for all seeds)
const DEMO_SCHOOL_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo bursar user ID
const DEMO_BURSAR_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo guardian user ID
const DEMO_GUARDIAN_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Demo student IDs
const DEMO_STUDENT_A_ID: &str = "00000000-0000-0000-0000-000000000010";
const DEMO_STUDENT_B_ID: &str = "00000000-0000-0000-0000-000000000011";
/// Demo fee schedule IDs
const LUMP_FEE_ID: &str = "00000000-0000-0000-0000-000000000020";
const SPLIT_FEE_ID: &str = "00000000-0000-0000-0000-000000000021";
const INSTALLMENT_1_ID: &str = "00000000-0000-0000-0000-000000000022";
const INSTALLMENT_2_ID: &str = "00000000-0000-0000-0000-000000000023";
const INSTALLMENT_3_ID: &str = "00000000-0000-0000-0000-000000000024";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = scolara_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo school...");
    seed_school(&db).await;

    println!("Seeding demo students...");
    seed_students(&db).await;

    println!("Seeding guardian link...");
    seed_guardian_link(&db).await;

    println!("Seeding fee schedules...");
    seed_fee_schedules(&db).await;

    println!("Seeding complete!");
    print_dev_tokens();
}

fn parse_id(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("seed id constants are valid UUIDs")
}

/// Seeds the demo school.
async fn seed_school(db: &DatabaseConnection) {
    if schools::Entity::find_by_id(parse_id(DEMO_SCHOOL_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo school already exists, skipping...");
        return;
    }

    let school = schools::ActiveModel {
        id: Set(parse_id(DEMO_SCHOOL_ID)),
        name: Set("Hillside Academy".to_string()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = school.insert(db).await {
        eprintln!("Failed to insert demo school: {e}");
    } else {
        println!("  Created demo school: Hillside Academy");
    }
}

/// Seeds two demo students.
async fn seed_students(db: &DatabaseConnection) {
    let seeds = [
        (DEMO_STUDENT_A_ID, "Amina", "Okafor"),
        (DEMO_STUDENT_B_ID, "Daniel", "Mensah"),
    ];

    for (id, first, last) in seeds {
        if students::Entity::find_by_id(parse_id(id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Student {first} {last} already exists, skipping...");
            continue;
        }

        let student = students::ActiveModel {
            id: Set(parse_id(id)),
            school_id: Set(parse_id(DEMO_SCHOOL_ID)),
            first_name: Set(first.to_string()),
            last_name: Set(last.to_string()),
            grade_level_id: Set(None),
            classroom_id: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = student.insert(db).await {
            eprintln!("Failed to insert student {first} {last}: {e}");
        } else {
            println!("  Created student: {first} {last}");
        }
    }
}

/// Links the demo guardian to the first student.
async fn seed_guardian_link(db: &DatabaseConnection) {
    let existing = guardian_links::Entity::find()
        .all(db)
        .await
        .unwrap_or_default();
    if existing
        .iter()
        .any(|link| link.guardian_user_id == parse_id(DEMO_GUARDIAN_ID))
    {
        println!("  Guardian link already exists, skipping...");
        return;
    }

    let link = guardian_links::ActiveModel {
        id: Set(Uuid::new_v4()),
        school_id: Set(parse_id(DEMO_SCHOOL_ID)),
        guardian_user_id: Set(parse_id(DEMO_GUARDIAN_ID)),
        student_id: Set(parse_id(DEMO_STUDENT_A_ID)),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = link.insert(db).await {
        eprintln!("Failed to insert guardian link: {e}");
    } else {
        println!("  Linked demo guardian to Amina Okafor");
    }
}

/// Seeds a lump fee and a split fee with three monthly installments.
async fn seed_fee_schedules(db: &DatabaseConnection) {
    if fee_schedules::Entity::find_by_id(parse_id(LUMP_FEE_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Fee schedules already exist, skipping...");
        return;
    }

    // Lump fee: one-off activity fee, paid against the principal directly.
    let lump = fee_schedules::ActiveModel {
        id: Set(parse_id(LUMP_FEE_ID)),
        school_id: Set(parse_id(DEMO_SCHOOL_ID)),
        name: Set("Activity Fee".to_string()),
        term: Set(Some("2026 Term 1".to_string())),
        amount_cents: Set(25_000),
        is_installment: Set(false),
        parent_fee_id: Set(None),
        installment_order: Set(None),
        due_date: Set(NaiveDate::from_ymd_opt(2026, 9, 30)),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };
    insert_fee(db, lump, "Activity Fee", 25_000).await;

    // Split fee: tuition principal plus three ordered installments.
    let principal = fee_schedules::ActiveModel {
        id: Set(parse_id(SPLIT_FEE_ID)),
        school_id: Set(parse_id(DEMO_SCHOOL_ID)),
        name: Set("Tuition".to_string()),
        term: Set(Some("2026 Term 1".to_string())),
        amount_cents: Set(300_000),
        is_installment: Set(false),
        parent_fee_id: Set(None),
        installment_order: Set(None),
        due_date: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };
    insert_fee(db, principal, "Tuition", 300_000).await;

    let installments = [
        (INSTALLMENT_1_ID, 1, 100_000, (2026, 9, 15)),
        (INSTALLMENT_2_ID, 2, 100_000, (2026, 10, 15)),
        (INSTALLMENT_3_ID, 3, 100_000, (2026, 11, 15)),
    ];

    for (id, order, amount, (year, month, day)) in installments {
        let installment = fee_schedules::ActiveModel {
            id: Set(parse_id(id)),
            school_id: Set(parse_id(DEMO_SCHOOL_ID)),
            name: Set(format!("Tuition Installment {order}")),
            term: Set(Some("2026 Term 1".to_string())),
            amount_cents: Set(amount),
            is_installment: Set(true),
            parent_fee_id: Set(Some(parse_id(SPLIT_FEE_ID))),
            installment_order: Set(Some(order)),
            due_date: Set(NaiveDate::from_ymd_opt(year, month, day)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };
        insert_fee(db, installment, &format!("Tuition Installment {order}"), amount).await;
    }
}

async fn insert_fee(
    db: &DatabaseConnection,
    fee: fee_schedules::ActiveModel,
    label: &str,
    amount_cents: i64,
) {
    if let Err(e) = fee.insert(db).await {
        eprintln!("Failed to insert {label}: {e}");
    } else {
        println!(
            "  Created fee schedule: {label} ({})",
            format_cents(amount_cents)
        );
    }
}

/// Prints tokens for manual testing against the local server.
fn print_dev_tokens() {
    let secret = std::env::var("SCOLARA__JWT__SECRET")
        .unwrap_or_else(|_| "change-me-in-production".to_string());
    let jwt = JwtService::new(JwtConfig {
        secret,
        access_token_expires_minutes: 8 * 60,
    });

    let school_id = parse_id(DEMO_SCHOOL_ID);
    let principals = [
        ("bursar", parse_id(DEMO_BURSAR_ID), Role::Bursar),
        ("parent", parse_id(DEMO_GUARDIAN_ID), Role::Parent),
    ];

    println!("\nDev tokens (8h expiry):");
    for (label, user_id, role) in principals {
        match jwt.generate_access_token(user_id, school_id, role) {
            Ok(token) => println!("  {label}: {token}"),
            Err(e) => eprintln!("  Failed to mint {label} token: {e}"),
        }
    }
}
