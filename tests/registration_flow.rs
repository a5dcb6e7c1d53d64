use appointment_ui::{FormKind, Page, Severity, Submission};

const REGISTER_HTML: &str = r#"
<div class="container">
  <h2>Create account</h2>
  <form id="register-form" action="/register" method="POST" novalidate>
    <input id="username" name="username">
    <input id="email" name="email" type="email">
    <input id="password" name="password" type="password">
    <div class="progress"><div id="password-strength" class="progress-bar"></div></div>
    <input id="confirm_password" name="confirm_password" type="password">
    <input id="full_name" name="full_name">
    <input id="phone" name="phone" type="tel">
    <select id="user_type" name="user_type">
      <option value="patient" selected>Patient</option>
      <option value="doctor">Doctor</option>
    </select>
    <div id="doctor-fields" style="display: none;">
      <input id="specialization" name="specialization">
      <input id="qualification" name="qualification">
      <input id="consultation_fee" name="consultation_fee" type="number">
    </div>
    <button id="register" type="submit">Register</button>
  </form>
</div>
"#;

fn fill_patient(page: &mut Page) -> appointment_ui::Result<()> {
    page.type_text("#username", "jane_doe")?;
    page.type_text("#email", "jane@example.com")?;
    page.type_text("#password", "Secret123")?;
    page.type_text("#confirm_password", "Secret123")?;
    page.type_text("#full_name", "Jane Doe")?;
    Ok(())
}

fn registration_page() -> appointment_ui::Result<Page> {
    let mut page = Page::from_html(REGISTER_HTML)?;
    page.bind_form_validator("#register-form", FormKind::Registration)?;
    Ok(page)
}

#[test]
fn empty_registration_is_cancelled_with_danger_alert() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    page.click("#register")?;

    assert!(page.take_submissions().is_empty());
    page.assert_text(".alert", "Please fill in all required fields!")?;
    assert_eq!(
        page.attr(".alert", "class")?.as_deref(),
        Some("alert alert-danger alert-dismissible fade show")
    );
    Ok(())
}

#[test]
fn valid_patient_registration_submits() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    fill_patient(&mut page)?;
    page.click("#register")?;

    assert_eq!(
        page.take_submissions(),
        vec![Submission {
            form_id: Some("register-form".into()),
            action: Some("/register".into()),
            method: "post".into(),
        }]
    );
    assert_eq!(page.count(".alert")?, 0);
    Ok(())
}

#[test]
fn checks_run_in_order_and_stop_at_first_failure() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    fill_patient(&mut page)?;
    page.type_text("#username", "jd")?;
    page.type_text("#email", "not-an-email")?;
    page.submit("#register-form")?;

    assert_eq!(page.count(".alert")?, 1);
    page.assert_text(
        ".alert",
        "Username must be 3-20 characters and contain only letters, numbers, and underscores!",
    )?;
    Ok(())
}

#[test]
fn weak_password_is_a_warning() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    fill_patient(&mut page)?;
    page.type_text("#password", "alllowercase1")?;
    page.type_text("#confirm_password", "alllowercase1")?;

    assert!(!page.validate_registration_form()?);
    assert_eq!(
        page.attr(".alert", "class")?.as_deref(),
        Some("alert alert-warning alert-dismissible fade show")
    );
    Ok(())
}

#[test]
fn mismatched_confirmation_is_rejected() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    fill_patient(&mut page)?;
    page.type_text("#confirm_password", "Secret124")?;

    assert!(!page.validate_registration_form()?);
    page.assert_text(".alert", "Passwords do not match!")?;
    Ok(())
}

#[test]
fn doctor_registration_requires_doctor_fields() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    fill_patient(&mut page)?;
    page.select_option("#user_type", "doctor")?;
    page.assert_style("#doctor-fields", "display", "block")?;
    assert!(page.is_required("#qualification")?);

    page.type_text("#specialization", "Cardiology")?;
    page.submit("#register-form")?;
    page.assert_text(".alert", "Please fill in all doctor-specific fields!")?;
    assert!(page.take_submissions().is_empty());

    page.type_text("#qualification", "MD")?;
    page.type_text("#consultation_fee", "abc")?;
    page.submit("#register-form")?;
    page.assert_text(".alert", "Consultation fee must be greater than 0!")?;

    page.type_text("#consultation_fee", "75")?;
    page.submit("#register-form")?;
    assert_eq!(page.take_submissions().len(), 1);
    Ok(())
}

#[test]
fn doctor_fields_are_ignored_for_patients() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    fill_patient(&mut page)?;
    page.select_option("#user_type", "doctor")?;
    page.select_option("#user_type", "patient")?;
    page.assert_style("#doctor-fields", "display", "none")?;
    assert!(!page.is_required("#specialization")?);

    assert!(page.validate_registration_form()?);
    Ok(())
}

#[test]
fn phone_input_keeps_ten_digits() -> appointment_ui::Result<()> {
    let mut page = registration_page()?;
    page.type_text("#phone", "(555) 123-4567 ext 89")?;
    page.assert_value("#phone", "5551234567")?;
    Ok(())
}

#[test]
fn login_form_checks_lengths() -> appointment_ui::Result<()> {
    let mut page = Page::from_html(
        r#"
        <div class="container">
          <form id="login-form" action="/login" method="POST">
            <input id="username"><input id="password" type="password">
            <button id="login">Log in</button>
          </form>
        </div>
        "#,
    )?;
    page.bind_form_validator("#login-form", FormKind::Login)?;

    page.click("#login")?;
    page.assert_text(".alert", "Please enter both username and password!")?;

    page.type_text("#username", "ab")?;
    page.type_text("#password", "whatever1")?;
    page.click("#login")?;
    page.assert_text(".alert", "Please enter a valid username!")?;

    page.type_text("#username", "abc")?;
    page.type_text("#password", "short")?;
    page.click("#login")?;
    page.assert_text(".alert", "Please enter a valid password!")?;
    assert_eq!(page.count(".alert")?, 3);

    page.type_text("#password", "longenough")?;
    page.click("#login")?;
    assert_eq!(page.take_submissions().len(), 1);
    Ok(())
}

#[test]
fn profile_phone_is_optional_but_checked() -> appointment_ui::Result<()> {
    let mut page = Page::from_html(
        r#"
        <div class="container">
          <form id="profile-form">
            <input id="full_name" value="Jane Doe">
            <input id="email" value="jane@example.com">
            <input id="phone" type="text" value="">
          </form>
        </div>
        "#,
    )?;

    assert!(page.validate_profile_form()?);

    page.type_text("#phone", "12345")?;
    assert!(!page.validate_profile_form()?);
    page.assert_text(".alert", "Please enter a valid phone number!")?;

    page.type_text("#email", "jane@example")?;
    assert!(!page.validate_profile_form()?);
    page.assert_text(".alert", "Please enter a valid email address!")?;
    Ok(())
}

#[test]
fn binding_a_validator_to_a_non_form_is_a_type_mismatch() -> appointment_ui::Result<()> {
    let mut page = Page::from_html("<div id='not-a-form'></div>")?;
    let err = page
        .bind_form_validator("#not-a-form", FormKind::Profile)
        .expect_err("div is not a form");
    assert!(matches!(err, appointment_ui::Error::TypeMismatch { .. }));
    Ok(())
}

#[test]
fn duplicate_ids_read_the_first_field_throughout() -> appointment_ui::Result<()> {
    let mut page = Page::from_html(
        r#"
        <div class="container">
          <input id="reason" value="first">
          <input id="reason" value="second">
        </div>
        "#,
    )?;
    page.assert_value("#reason", "first")?;
    page.show_alert("x", Severity::Info)?;
    page.assert_value("#reason", "first")?;
    Ok(())
}

#[test]
fn phone_type_matches_regardless_of_case() -> appointment_ui::Result<()> {
    let mut page = Page::from_html(
        "<div class='container'><input id='mobile' type='TEL'></div>",
    )?;
    page.type_text("#mobile", "(555) 123-4567 99")?;
    page.assert_value("#mobile", "5551234567")?;
    Ok(())
}
