use parishdesk_core::model::family::{FamilySnapshot, MemberSnapshot};
use parishdesk_core::{
    family_search_request, member_search_request, FamilyApi, InMemoryDirectory, MemberSearchRow,
    SearchPager,
};

fn family(id: i64, head_name: &str, unit: &str, phone: &str) -> FamilySnapshot {
    FamilySnapshot {
        id,
        address: format!("{head_name} House"),
        unit: unit.to_string(),
        house_name: None,
        photo_url: None,
        family_members: vec![MemberSnapshot {
            id: id * 10,
            name: head_name.to_string(),
            dob: Some("1980-01-15".to_string()),
            phone_number: Some(phone.to_string()),
            email_id: None,
            blood_group: None,
            is_family_head: true,
            couple_no: None,
        }],
        couples: Vec::new(),
    }
}

#[test]
fn family_search_body_matches_the_server_contract() {
    let request = family_search_request(Some("ST_THOMAS"), " Jo ", 1);
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "pageSize": 20,
            "offset": 1,
            "node": {
                "type": "filterCriteria",
                "evaluationType": "AND",
                "filters": [
                    {
                        "type": "fieldFilter",
                        "fieldName": "unit",
                        "operation": "EQUALS",
                        "values": ["ST_THOMAS"]
                    },
                    {
                        "type": "fieldFilter",
                        "fieldName": "name",
                        "operation": "STARTS_WITH",
                        "values": ["Jo"]
                    }
                ]
            }
        })
    );
}

#[test]
fn all_units_and_blank_text_produce_an_empty_filter_list() {
    let request = family_search_request(None, "   ", 1);
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["node"]["filters"], serde_json::json!([]));
    assert_eq!(body["pageSize"], 20);
}

#[test]
fn directory_search_filters_by_unit_and_head_name_prefix() {
    let directory = InMemoryDirectory::new();
    directory.insert_family(family(1, "Jose", "ST_THOMAS", "9447000001"));
    directory.insert_family(family(2, "Joseph", "ST_THOMAS", "9447000002"));
    directory.insert_family(family(3, "Mary", "ST_THOMAS", "9447000003"));
    directory.insert_family(family(4, "Jomon", "HOLY_FAMILY", "9447000004"));

    let rows = directory
        .search_families(&family_search_request(Some("ST_THOMAS"), "jo", 1))
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Jose", "Joseph"]);
    assert!(rows.iter().all(|row| row.unit == "ST_THOMAS"));
    assert_eq!(rows[0].contact.as_deref(), Some("9447000001"));

    // No unit filter widens the match to every unit.
    let rows = directory
        .search_families(&family_search_request(None, "Jo", 1))
        .unwrap();
    assert_eq!(rows.len(), 3);

    // Pages past the data come back empty.
    let rows = directory
        .search_families(&family_search_request(None, "Jo", 2))
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn member_picker_pages_until_an_empty_page_stops_the_scroll() {
    let directory = InMemoryDirectory::new();
    let mut crowd = family(1, "Member 01", "ST_THOMAS", "9447000001");
    for index in 2..=25 {
        crowd.family_members.push(MemberSnapshot {
            id: 100 + index,
            name: format!("Member {index:02}"),
            dob: None,
            phone_number: None,
            email_id: None,
            blood_group: None,
            is_family_head: false,
            couple_no: None,
        });
    }
    directory.insert_family(crowd);

    let mut pager = SearchPager::new();
    let request = pager.begin_search("Member").unwrap();
    pager.absorb(directory.search_members(&request).unwrap());
    assert_eq!(pager.rows().len(), 20);
    assert!(pager.has_more());

    let request = pager.next_page().unwrap();
    pager.absorb(directory.search_members(&request).unwrap());
    assert_eq!(pager.rows().len(), 25);
    assert_eq!(pager.rows()[24].name, "Member 25");
    assert!(pager.has_more());

    // The probe past the end comes back empty and parks the pager.
    let request = pager.next_page().unwrap();
    pager.absorb(directory.search_members(&request).unwrap());
    assert_eq!(pager.rows().len(), 25);
    assert!(!pager.has_more());
    assert!(pager.next_page().is_none());
}

#[test]
fn blank_search_clears_rows_without_issuing_a_request() {
    let mut pager = SearchPager::new();
    pager.seed(vec![MemberSearchRow {
        id: 7,
        name: "Thomas Mathew".to_string(),
    }]);
    assert_eq!(pager.rows().len(), 1);

    assert!(pager.begin_search("   ").is_none());
    assert!(pager.rows().is_empty());
    assert_eq!(pager.search_text(), "");
}

#[test]
fn fresh_search_replaces_the_accumulated_rows() {
    let directory = InMemoryDirectory::new();
    directory.insert_family(family(1, "Jose", "ST_THOMAS", "9447000001"));
    directory.insert_family(family(2, "Mary", "ST_THOMAS", "9447000002"));

    let mut pager = SearchPager::new();
    let request = pager.begin_search("Jose").unwrap();
    pager.absorb(directory.search_members(&request).unwrap());
    assert_eq!(pager.rows().len(), 1);

    let request = pager.begin_search("Mary").unwrap();
    assert_eq!(request.offset, 1);
    pager.absorb(directory.search_members(&request).unwrap());
    assert_eq!(pager.rows().len(), 1);
    assert_eq!(pager.rows()[0].name, "Mary");
}

#[test]
fn member_search_request_is_a_single_name_filter() {
    let body = serde_json::to_value(member_search_request("Tho", 2)).unwrap();
    assert_eq!(body["offset"], 2);
    assert_eq!(body["node"]["filters"][0]["fieldName"], "name");
    assert_eq!(body["node"]["filters"][0]["operation"], "STARTS_WITH");
    assert_eq!(body["node"]["filters"][0]["values"], serde_json::json!(["Tho"]));
}
