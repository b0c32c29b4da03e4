use common_crypto::SecretString;
use payment_gateway::{
    HashCasing, PaymentRequest, Signer, SigningConfig, SigningError, Verifier,
    WebhookNotification,
};

const SECRET: &str = "215114531AFF7134A94C88CEEA48E";
const SCENARIO_ONE_DIGEST: &str = "3c7dadbafe868535f7fe79674c531d36f321c91730fedadcc9479b84413610a61ed692a1641c18ba609cb12990f1d068c62157a9bb362e5bae3a97bc75807e5c";
const SCENARIO_ONE_LOWERCASE_DIGEST: &str = "7ad8bd21319bb210442ce801ae05998773c1ede838ded2fd8a59f43362bf049cc2f2e97933feec08882782c75d93cd227e2843b41d6076f9d734fb598966337a";

fn secret() -> SecretString {
    SecretString::new(SECRET).unwrap()
}

fn signer(casing: HashCasing) -> Signer {
    Signer::new(SigningConfig::new(secret()).with_casing(casing))
}

fn scenario_one() -> PaymentRequest {
    PaymentRequest {
        site_code: "TSTSTE0001".into(),
        country_code: "ZA".into(),
        currency_code: "ZAR".into(),
        amount: "25.00".into(),
        transaction_reference: "INV-TEST-001".into(),
        bank_reference: "INV-TEST-001".into(),
        customer: None,
        customer_name: None,
        customer_mobile: None,
        cancel_url: "https://merchant.example.co.za/api/payments/redirect/cancel".into(),
        error_url: "https://merchant.example.co.za/api/payments/redirect/error".into(),
        success_url: "https://merchant.example.co.za/api/payments/redirect/success".into(),
        notify_url: "https://merchant.example.co.za/api/payments/webhook".into(),
        is_test: true,
        optional1: None,
        optional2: None,
        optional3: None,
        optional4: None,
        optional5: None,
    }
}

#[test]
fn scenario_one_reproduces_reference_digest() {
    let signed = signer(HashCasing::Preserve).sign_request(scenario_one(), secret()).unwrap();
    assert_eq!(signed.hash_check(), SCENARIO_ONE_DIGEST);
}

#[test]
fn scenario_one_lowercase_rule() {
    let signed = signer(HashCasing::Lowercase).sign_request(scenario_one(), secret()).unwrap();
    assert_eq!(signed.hash_check(), SCENARIO_ONE_LOWERCASE_DIGEST);
}

#[test]
fn signing_is_deterministic() {
    let s = signer(HashCasing::Preserve);
    let a = s.sign_request(scenario_one(), secret()).unwrap();
    let b = s.sign_request(scenario_one(), secret()).unwrap();
    assert_eq!(a.hash_check(), b.hash_check());
}

#[test]
fn amount_without_decimals_rejected() {
    let mut request = scenario_one();
    request.amount = "25".into();
    let err = signer(HashCasing::Preserve).sign_request(request, secret()).unwrap_err();
    assert!(matches!(err, SigningError::InvalidFieldFormat { field: "Amount", .. }), "{err:?}");
}

#[test]
fn signed_request_serializes_hash_check_but_not_api_key() {
    let signed = signer(HashCasing::Preserve)
        .sign_request(scenario_one(), SecretString::new("merchant-api-key").unwrap())
        .unwrap();
    let value = serde_json::to_value(&signed).unwrap();
    assert_eq!(value["HashCheck"], SCENARIO_ONE_DIGEST);
    assert_eq!(value["TransactionReference"], "INV-TEST-001");
    assert!(!value.to_string().contains("merchant-api-key"));
    let form = signed.form_fields();
    assert_eq!(form.last().map(|(k, _)| *k), Some("ApiKey"));
}

#[test]
fn every_field_participates_in_the_digest() {
    let s = signer(HashCasing::Preserve);
    let mutations: [(&str, fn(&mut PaymentRequest)); 17] = [
        ("SiteCode", |r: &mut PaymentRequest| r.site_code = "TSTSTE0002".into()),
        ("CountryCode", |r: &mut PaymentRequest| r.country_code = "ZB".into()),
        ("CurrencyCode", |r: &mut PaymentRequest| r.currency_code = "ZAD".into()),
        ("Amount", |r: &mut PaymentRequest| r.amount = "25.01".into()),
        ("TransactionReference", |r: &mut PaymentRequest| r.transaction_reference = "INV-TEST-002".into()),
        ("BankReference", |r: &mut PaymentRequest| r.bank_reference = "INV-TEST-002".into()),
        ("Customer", |r: &mut PaymentRequest| r.customer = Some("Jane".into())),
        ("CancelUrl", |r: &mut PaymentRequest| r.cancel_url.push('x')),
        ("ErrorUrl", |r: &mut PaymentRequest| r.error_url.push('x')),
        ("SuccessUrl", |r: &mut PaymentRequest| r.success_url.push('x')),
        ("NotifyUrl", |r: &mut PaymentRequest| r.notify_url.push('x')),
        ("IsTest", |r: &mut PaymentRequest| r.is_test = false),
        ("Optional1", |r: &mut PaymentRequest| r.optional1 = Some("a".into())),
        ("Optional2", |r: &mut PaymentRequest| r.optional2 = Some("a".into())),
        ("Optional3", |r: &mut PaymentRequest| r.optional3 = Some("a".into())),
        ("Optional4", |r: &mut PaymentRequest| r.optional4 = Some("a".into())),
        ("Optional5", |r: &mut PaymentRequest| r.optional5 = Some("a".into())),
    ];
    for (field, mutate) in mutations {
        let mut request = scenario_one();
        mutate(&mut request);
        let signed = s.sign_request(request, secret()).unwrap();
        assert_ne!(signed.hash_check(), SCENARIO_ONE_DIGEST, "{field} did not change the digest");
    }
}

#[test]
fn notification_signed_with_same_secret_round_trips() {
    let config = SigningConfig::new(secret());
    let mut notification = WebhookNotification {
        site_code: Some("TSTSTE0001".into()),
        transaction_id: Some("b2c9a4f0-7d1e-4c55-9a0f-1f2e3d4c5b6a".into()),
        transaction_reference: Some("INV-TEST-001".into()),
        amount: Some("25.00".into()),
        status: Some("Complete".into()),
        currency_code: Some("ZAR".into()),
        is_test: Some(true),
        ..Default::default()
    };
    let fields = payment_gateway::canonicalize_notification(&notification).unwrap();
    let digest = Signer::new(config.clone()).sign_fields(&fields);
    assert_eq!(
        digest,
        "7cc55f58b68c2b3f51a092c2b0590bc406ef560de416bf346de891fddc44c0d7b2a6f155aca5f059e86d506fb05ad0b761f34a79867c70658c3b7d3c297662c2"
    );
    notification.hash = Some(digest);
    assert!(Verifier::new(config).authenticate(notification).is_ok());
}
