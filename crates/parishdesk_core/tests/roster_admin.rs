use parishdesk_core::model::family::PhotoUpload;
use parishdesk_core::model::roster::{
    AssignedCard, AssignedPosition, Position, RepresentativeTemplate, TemplateCard,
    TemplatePosition, UnitRecord, UnitRepresentatives,
};
use parishdesk_core::service::roster_service::{
    CommitteeCardDraft, CommitteeRowDraft, TemplateCardDraft,
};
use parishdesk_core::{
    CommitteeDraft, InMemoryDirectory, MemberSearchRow, RosterError, RosterService, TemplateDraft,
};

/// Unit 3 with a two-card template: Executive (President, Secretary) and
/// Media (Convener).
fn seed_board_world(directory: &InMemoryDirectory) {
    directory.insert_unit(UnitRecord {
        id: 3,
        name: "St. Thomas".to_string(),
    });
    directory.insert_template(RepresentativeTemplate {
        id: 90,
        name: "Unit Board".to_string(),
        cards: vec![
            TemplateCard {
                id: 91,
                title: "Executive".to_string(),
                positions: vec![
                    TemplatePosition {
                        id: 1,
                        name: "President".to_string(),
                    },
                    TemplatePosition {
                        id: 2,
                        name: "Secretary".to_string(),
                    },
                ],
            },
            TemplateCard {
                id: 92,
                title: "Media".to_string(),
                positions: vec![TemplatePosition {
                    id: 4,
                    name: "Convener".to_string(),
                }],
            },
        ],
    });
}

fn seed_stored_assignment(directory: &InMemoryDirectory) {
    directory.insert_representatives(
        3,
        UnitRepresentatives {
            cards: vec![AssignedCard {
                title: "Executive".to_string(),
                positions: vec![AssignedPosition {
                    position_id: 1,
                    member_id: Some(7),
                    member_name: Some("Thomas Mathew".to_string()),
                }],
            }],
            cover_photo_url: Some("https://cdn.example.com/cover.jpg".to_string()),
            inner_cover_photo_url: None,
        },
    );
}

#[test]
fn position_admin_round_trip() {
    let directory = InMemoryDirectory::new();
    let service = RosterService::new(directory.clone());

    service.create_position("Secretary").unwrap();
    service.create_position("  Treasurer ").unwrap();

    let mut names: Vec<String> = service
        .list_positions()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Secretary", "Treasurer"]);

    let id = service
        .list_positions()
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Secretary")
        .unwrap()
        .id;
    service.rename_position(id, "General Secretary").unwrap();
    service.delete_position(id).unwrap();
    assert!(service
        .list_positions()
        .unwrap()
        .iter()
        .all(|p| p.name == "Treasurer"));
}

#[test]
fn unit_admin_round_trip() {
    let directory = InMemoryDirectory::new();
    let service = RosterService::new(directory.clone());

    service.create_unit(" St. George ").unwrap();
    let unit = service.list_units().unwrap().remove(0);
    assert_eq!(unit.name, "St. George");

    service.rename_unit(unit.id, "St. George South").unwrap();
    assert_eq!(service.get_unit(unit.id).unwrap().name, "St. George South");

    service.delete_unit(unit.id).unwrap();
    assert!(service.list_units().unwrap().is_empty());
}

#[test]
fn blank_names_are_rejected_before_any_call() {
    let directory = InMemoryDirectory::new();
    let service = RosterService::new(directory.clone());

    assert!(matches!(
        service.create_position("   "),
        Err(RosterError::InvalidName)
    ));
    assert!(matches!(
        service.create_unit(""),
        Err(RosterError::InvalidName)
    ));
    assert!(service.list_positions().unwrap().is_empty());
    assert!(service.list_units().unwrap().is_empty());
}

#[test]
fn committee_draft_builds_the_wire_body_or_pinpoints_the_gap() {
    let draft = CommitteeDraft {
        name: " Parish Council ".to_string(),
        cards: vec![CommitteeCardDraft {
            title: "Office Bearers".to_string(),
            rows: vec![
                CommitteeRowDraft {
                    position_id: Some(1),
                    member_id: Some(7),
                },
                CommitteeRowDraft {
                    position_id: Some(2),
                    member_id: None,
                },
            ],
        }],
    };

    let request = draft.build().unwrap();
    assert_eq!(request.name, "Parish Council");

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["cards"][0]["positions"][0]["positionId"], 1);
    assert_eq!(body["cards"][0]["positions"][0]["memberId"], 7);
    // A vacant seat goes out as null, not as an absent key.
    assert_eq!(
        body["cards"][0]["positions"][1]["memberId"],
        serde_json::Value::Null
    );

    let mut untitled = draft.clone();
    untitled.cards[0].title = "  ".to_string();
    assert!(matches!(
        untitled.build(),
        Err(RosterError::MissingCardTitle)
    ));

    let mut unpositioned = draft.clone();
    unpositioned.cards[0].rows[1].position_id = None;
    match unpositioned.build() {
        Err(RosterError::MissingPosition { card }) => assert_eq!(card, "Office Bearers"),
        other => panic!("expected MissingPosition, got {other:?}"),
    }
}

#[test]
fn committee_admin_round_trip() {
    let directory = InMemoryDirectory::new();
    directory.insert_position(Position {
        id: 1,
        name: "President".to_string(),
    });
    directory.insert_position(Position {
        id: 2,
        name: "Secretary".to_string(),
    });
    let service = RosterService::new(directory.clone());

    let draft = CommitteeDraft {
        name: "Parish Council".to_string(),
        cards: vec![CommitteeCardDraft {
            title: "Office Bearers".to_string(),
            rows: vec![
                CommitteeRowDraft {
                    position_id: Some(1),
                    member_id: Some(7),
                },
                CommitteeRowDraft {
                    position_id: Some(2),
                    member_id: None,
                },
            ],
        }],
    };
    service.create_committee(&draft).unwrap();

    let committee = service.list_committees().unwrap().remove(0);
    assert_eq!(committee.name, "Parish Council");
    let cards = directory.committee_cards(committee.id).unwrap();
    assert_eq!(cards[0].title, "Office Bearers");
    assert_eq!(cards[0].positions[0].member_id, Some(7));
    assert_eq!(cards[0].positions[1].member_id, None);

    service
        .rename_committee(committee.id, "Pastoral Council")
        .unwrap();
    assert_eq!(service.list_committees().unwrap()[0].name, "Pastoral Council");

    service.delete_committee(committee.id).unwrap();
    assert!(service.list_committees().unwrap().is_empty());
    assert!(directory.committee_cards(committee.id).is_none());
}

#[test]
fn template_create_resolves_position_names_from_the_catalog() {
    let directory = InMemoryDirectory::new();
    directory.insert_position(Position {
        id: 1,
        name: "President".to_string(),
    });
    directory.insert_position(Position {
        id: 2,
        name: "Secretary".to_string(),
    });
    let service = RosterService::new(directory.clone());

    let draft = TemplateDraft {
        name: "Unit Board".to_string(),
        cards: vec![TemplateCardDraft {
            title: "Executive".to_string(),
            position_ids: vec![1, 2, 9],
        }],
    };
    service.create_template(&draft).unwrap();

    let template = service.list_templates().unwrap().remove(0);
    assert_eq!(template.name, "Unit Board");
    let names: Vec<&str> = template.cards[0]
        .positions
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["President", "Secretary", "position 9"]);
}

#[test]
fn board_merges_the_template_with_the_stored_assignment() {
    let directory = InMemoryDirectory::new();
    seed_board_world(&directory);
    seed_stored_assignment(&directory);
    let service = RosterService::new(directory.clone());

    let board = service.load_representative_board(3).unwrap();
    assert_eq!(board.unit.name, "St. Thomas");
    assert_eq!(board.template_id, 90);

    // Template card order survives the merge.
    let titles: Vec<&str> = board.cards.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Executive", "Media"]);

    assert_eq!(board.cards[0].slots[0].member_id, Some(7));
    assert_eq!(board.cards[0].slots[1].member_id, None);
    assert_eq!(board.cards[1].slots[0].member_id, None);

    assert_eq!(
        board.assigned_members,
        vec![MemberSearchRow {
            id: 7,
            name: "Thomas Mathew".to_string(),
        }]
    );
    assert_eq!(
        board.cover_photo_url.as_deref(),
        Some("https://cdn.example.com/cover.jpg")
    );
    assert!(board.inner_cover_photo_url.is_none());
}

#[test]
fn board_without_a_stored_assignment_starts_empty() {
    let directory = InMemoryDirectory::new();
    seed_board_world(&directory);
    let service = RosterService::new(directory.clone());

    let board = service.load_representative_board(3).unwrap();
    assert!(board
        .cards
        .iter()
        .flat_map(|card| card.slots.iter())
        .all(|slot| slot.member_id.is_none()));
    assert!(board.assigned_members.is_empty());
    assert!(board.cover_photo_url.is_none());
}

#[test]
fn board_needs_a_template_to_load() {
    let directory = InMemoryDirectory::new();
    directory.insert_unit(UnitRecord {
        id: 3,
        name: "St. Thomas".to_string(),
    });
    let service = RosterService::new(directory.clone());

    assert!(matches!(
        service.load_representative_board(3),
        Err(RosterError::NoTemplateAvailable)
    ));
}

#[test]
fn board_submission_sends_every_slot_with_null_for_unassigned() {
    let directory = InMemoryDirectory::new();
    seed_board_world(&directory);
    seed_stored_assignment(&directory);
    let service = RosterService::new(directory.clone());

    let board = service.load_representative_board(3).unwrap();
    let board = board.with_member(91, 2, Some(9)).unwrap();
    assert!(matches!(
        board.with_member(91, 99, Some(9)),
        Err(RosterError::SlotNotFound {
            card_id: 91,
            position_id: 99,
        })
    ));

    service.submit_representatives(&board, None, None).unwrap();

    let sent = directory.last_assignment().unwrap();
    assert_eq!(sent.unit_id, 3);
    assert_eq!(sent.card_position_member_map[&91][&1], Some(7));
    assert_eq!(sent.card_position_member_map[&91][&2], Some(9));
    assert_eq!(sent.card_position_member_map[&92][&4], None);

    // The vacant Convener seat is an explicit null on the wire.
    let body = serde_json::to_value(&sent).unwrap();
    let media = body["cardPositionMemberMap"]["92"].as_object().unwrap();
    assert!(media.contains_key("4"));
    assert_eq!(media["4"], serde_json::Value::Null);

    let stored = directory.representatives_for(3).unwrap();
    assert_eq!(stored.cards[0].positions[1].member_id, Some(9));
    assert_eq!(stored.cards[1].positions[0].member_id, None);
    // No new photo was sent, so the previous cover survives.
    assert_eq!(
        stored.cover_photo_url.as_deref(),
        Some("https://cdn.example.com/cover.jpg")
    );
}

#[test]
fn board_submission_can_replace_the_cover_photos() {
    let directory = InMemoryDirectory::new();
    seed_board_world(&directory);
    seed_stored_assignment(&directory);
    let service = RosterService::new(directory.clone());

    let board = service.load_representative_board(3).unwrap();
    let cover = PhotoUpload {
        file_name: "cover.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![9, 9, 9],
    };
    service
        .submit_representatives(&board, Some(&cover), None)
        .unwrap();

    let stored = directory.representatives_for(3).unwrap();
    assert_eq!(stored.cover_photo_url.as_deref(), Some("memory://units/3/cover"));
    assert!(stored.inner_cover_photo_url.is_none());
}
