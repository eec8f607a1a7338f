/// Integration tests for lead assignment
///
/// Run with: cargo test --test assignment_tests

mod common;

use common::*;
use leadcrm_shared::error::CrmError;
use leadcrm_shared::services::Redirect;

#[tokio::test]
async fn test_assign_moves_visibility_between_agents() {
    let h = harness();
    let org = organisation(&h.service, "acme").await;
    let (alice, alice_principal) = agent(&h.service, &org, "alice").await;
    let (bob, bob_principal) = agent(&h.service, &org, "bob").await;
    let deal = lead(&h.service, &org, "Deal").await;

    let outcome = h
        .service
        .assign_lead(&org.organisor, deal.id, alice.id)
        .await
        .unwrap();
    assert_eq!(outcome.value.agent_id, Some(alice.id));
    assert_eq!(outcome.redirect, Redirect::LeadList);
    assert!(outcome.notification.is_none());

    assert!(h.service.get_lead(&alice_principal, deal.id).await.is_ok());
    assert!(h.service.get_lead(&bob_principal, deal.id).await.is_err());

    h.service
        .assign_lead(&org.organisor, deal.id, bob.id)
        .await
        .unwrap();

    assert!(h.service.get_lead(&alice_principal, deal.id).await.is_err());
    assert_eq!(
        h.service.get_lead(&bob_principal, deal.id).await.unwrap().agent_id,
        Some(bob.id)
    );

    let organisor_view = h.service.list_leads(&org.organisor).await.unwrap();
    assert_eq!(ids(&organisor_view.assigned), vec![deal.id]);
    assert!(organisor_view.unassigned.unwrap().is_empty());
}

#[tokio::test]
async fn test_assign_is_idempotent() {
    let h = harness();
    let org = organisation(&h.service, "acme").await;
    let (alice, _) = agent(&h.service, &org, "alice").await;
    let deal = lead(&h.service, &org, "Deal").await;

    let first = h
        .service
        .assign_lead(&org.organisor, deal.id, alice.id)
        .await
        .unwrap();
    let second = h
        .service
        .assign_lead(&org.organisor, deal.id, alice.id)
        .await
        .unwrap();

    assert_eq!(first.value, second.value);
}

#[tokio::test]
async fn test_cross_organisation_assign_is_validation_error() {
    let h = harness();
    let acme = organisation(&h.service, "acme").await;
    let globex = organisation(&h.service, "globex").await;
    let (alice, _) = agent(&h.service, &acme, "alice").await;
    let (gary, _) = agent(&h.service, &globex, "gary").await;

    let deal = lead(&h.service, &acme, "Deal").await;
    h.service
        .assign_lead(&acme.organisor, deal.id, alice.id)
        .await
        .unwrap();

    let err = h
        .service
        .assign_lead(&acme.organisor, deal.id, gary.id)
        .await
        .unwrap_err();
    match err {
        CrmError::Validation(errors) => assert_eq!(errors[0].field, "agent"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let unchanged = h.service.get_lead(&acme.organisor, deal.id).await.unwrap();
    assert_eq!(unchanged.agent_id, Some(alice.id));
}

#[tokio::test]
async fn test_assign_foreign_lead_is_not_found() {
    let h = harness();
    let acme = organisation(&h.service, "acme").await;
    let globex = organisation(&h.service, "globex").await;
    let (alice, _) = agent(&h.service, &acme, "alice").await;
    let foreign = lead(&h.service, &globex, "Foreign").await;

    assert!(matches!(
        h.service
            .assign_lead(&acme.organisor, foreign.id, alice.id)
            .await,
        Err(CrmError::NotFound { entity: "Lead", .. })
    ));
}

#[tokio::test]
async fn test_agent_cannot_assign() {
    let h = harness();
    let org = organisation(&h.service, "acme").await;
    let (alice, alice_principal) = agent(&h.service, &org, "alice").await;
    let deal = lead(&h.service, &org, "Deal").await;

    assert!(matches!(
        h.service
            .assign_lead(&alice_principal, deal.id, alice.id)
            .await,
        Err(CrmError::Unauthorized(_))
    ));
    let deal = h.service.get_lead(&org.organisor, deal.id).await.unwrap();
    assert_eq!(deal.agent_id, None);
}

#[tokio::test]
async fn test_deleting_agent_unassigns_their_leads() {
    let h = harness();
    let org = organisation(&h.service, "acme").await;
    let (alice, _) = agent(&h.service, &org, "alice").await;
    let deal = lead(&h.service, &org, "Deal").await;
    h.service
        .assign_lead(&org.organisor, deal.id, alice.id)
        .await
        .unwrap();

    let outcome = h.service.delete_agent(&org.organisor, alice.id).await.unwrap();
    assert_eq!(outcome.redirect, Redirect::AgentList);

    let listing = h.service.list_leads(&org.organisor).await.unwrap();
    assert!(listing.assigned.is_empty());
    assert_eq!(ids(&listing.unassigned.unwrap()), vec![deal.id]);
    assert!(h.service.principal(alice.user_id).await.unwrap().is_none());
}
