//! Register and login pages.

use maud::{Markup, html};

use behonest_core::domain::User;
use behonest_core::forms::{FormErrors, LoginForm, RegistrationForm, USERNAME_MAX_LENGTH};

use super::{BaseLayout, Template};
use crate::urls::Route;

/// Sign-up form, optionally re-rendered with the previous attempt's errors.
pub struct RegisterPage<'a> {
    pub form: &'a RegistrationForm,
    pub errors: &'a FormErrors,
}

impl RegisterPage<'_> {
    pub fn render(&self, user: Option<&User>) -> Markup {
        let content = html! {
            h1 { "Register" }
            (non_field_errors(self.errors))
            form method="post" action=(Route::Register) novalidate {
                label for="id_username" { "Username" }
                input type="text" name="username" id="id_username"
                    maxlength=(USERNAME_MAX_LENGTH) value=(self.form.username) required autofocus;
                small { "Letters, digits and @/./+/-/_ only." }
                (field_errors(self.errors, "username"))

                label for="id_email" { "Email" }
                input type="email" name="email" id="id_email" value=(self.form.email) required;
                (field_errors(self.errors, "email"))

                label for="id_password1" { "Password" }
                input type="password" name="password1" id="id_password1" autocomplete="new-password" required;
                (field_errors(self.errors, "password1"))

                label for="id_password2" { "Password confirmation" }
                input type="password" name="password2" id="id_password2" autocomplete="new-password" required;
                (field_errors(self.errors, "password2"))

                button type="submit" { "Register" }
            }
            p {
                "Already have an account? "
                a href=(Route::Login) { "Log in" }
            }
        };

        BaseLayout::new("Register", Template::Register, user).render(content)
    }
}

/// Login form. `next` is carried through the form action's query string.
pub struct LoginPage<'a> {
    pub form: &'a LoginForm,
    pub errors: &'a FormErrors,
    pub next: Option<&'a str>,
}

impl LoginPage<'_> {
    pub fn render(&self, user: Option<&User>) -> Markup {
        let action = match self.next {
            Some(next) => Route::login_then(next),
            None => Route::Login.path(),
        };

        let content = html! {
            h1 { "Log in" }
            (non_field_errors(self.errors))
            form method="post" action=(action) novalidate {
                label for="id_username" { "Username" }
                input type="text" name="username" id="id_username"
                    value=(self.form.username) required autofocus;
                (field_errors(self.errors, "username"))

                label for="id_password" { "Password" }
                input type="password" name="password" id="id_password" autocomplete="current-password" required;
                (field_errors(self.errors, "password"))

                button type="submit" { "Log in" }
            }
            p {
                "No account yet? "
                a href=(Route::Register) { "Register" }
            }
        };

        BaseLayout::new("Log in", Template::Login, user).render(content)
    }
}

fn field_errors(errors: &FormErrors, field: &str) -> Markup {
    html! {
        @for message in errors.field(field) {
            small class="error" data-field=(field) { (message) }
        }
    }
}

fn non_field_errors(errors: &FormErrors) -> Markup {
    html! {
        @if !errors.non_field().is_empty() {
            div class="alert alert-error" role="alert" {
                @for message in errors.non_field() {
                    p { (message) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_page_keeps_values_and_shows_errors() {
        let form = RegistrationForm {
            username: "testuser3".into(),
            email: "testemail@gmail.com".into(),
            password1: "secret".into(),
            password2: "secret".into(),
        };
        let errors = form.validate().unwrap_err();

        let html = RegisterPage {
            form: &form,
            errors: &errors,
        }
        .render(None)
        .into_string();

        assert!(html.contains(r#"value="testuser3""#));
        assert!(html.contains(r#"value="testemail@gmail.com""#));
        assert!(html.contains(r#"data-field="password2""#));
        assert!(!html.contains(r#"value="secret""#));
    }

    #[test]
    fn test_login_page_posts_back_with_next() {
        let form = LoginForm::default();
        let mut errors = FormErrors::new();
        errors.add_non_field(LoginForm::INVALID_LOGIN);

        let html = LoginPage {
            form: &form,
            errors: &errors,
            next: Some("/posts/1/"),
        }
        .render(None)
        .into_string();

        assert!(html.contains(r#"action="/login/?next=%2Fposts%2F1%2F""#));
        assert!(html.contains("Please enter a correct username and password."));
    }
}
