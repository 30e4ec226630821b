//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `parishdesk_core` linkage.
//! - Run one in-memory load/edit/save cycle with deterministic output.

use parishdesk_core::model::family::{FamilySnapshot, MemberSnapshot};
use parishdesk_core::{core_version, FamilyService, InMemoryDirectory};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("parishdesk_core version={}", core_version());
    let directory = InMemoryDirectory::new();
    directory.insert_family(FamilySnapshot {
        id: 1,
        address: "Beach Road, Alappuzha".to_string(),
        unit: "ST_THOMAS".to_string(),
        house_name: Some("Puthenpurackal".to_string()),
        photo_url: None,
        family_members: vec![MemberSnapshot {
            id: 11,
            name: "Thomas Mathew".to_string(),
            dob: Some("1968-04-21".to_string()),
            phone_number: None,
            email_id: None,
            blood_group: Some("O_POSITIVE".to_string()),
            is_family_head: true,
            couple_no: None,
        }],
        couples: Vec::new(),
    });
    let service = FamilyService::new(directory.clone());
    let session = service.load_family(1)?;
    let outcome = service.save_family(&session.with_address("Convent Road, Alappuzha"))?;
    println!(
        "family 1 saved address='{}' members={}",
        outcome.session.address(),
        outcome.session.members().len()
    );
    Ok(())
}
