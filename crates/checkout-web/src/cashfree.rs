//! Cashfree JS SDK Binding
//!
//! Loads `cashfree.js` into the page (once), creates the SDK instance with
//! `Cashfree({ mode })` and launches hosted checkout through it.

use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

use checkout_core::{
    error::{CheckoutError, Result},
    sdk::{CheckoutOptions, CheckoutResult, PaymentSdk, SdkConfig, SdkLoader},
};

/// Hosted SDK script
pub const CASHFREE_SDK_URL: &str = "https://sdk.cashfree.com/js/v3/cashfree.js";

/// Global factory the script installs on `window`
const GLOBAL_FACTORY: &str = "Cashfree";

/// Loads the Cashfree SDK into the page
pub struct CashfreeLoader {
    script_url: String,
}

impl Default for CashfreeLoader {
    fn default() -> Self {
        Self {
            script_url: CASHFREE_SDK_URL.into(),
        }
    }
}

impl CashfreeLoader {
    /// Inject the SDK `<script>` unless the factory is already present
    async fn ensure_script(&self) -> std::result::Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        if Reflect::has(&window, &JsValue::from_str(GLOBAL_FACTORY))? {
            return Ok(());
        }

        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let head = document
            .head()
            .ok_or_else(|| JsValue::from_str("no <head>"))?;

        let script: HtmlScriptElement = document
            .create_element("script")?
            .dyn_into()
            .map_err(JsValue::from)?;
        script.set_src(&self.script_url);
        script.set_async(true);

        let loaded = Promise::new(&mut |resolve, reject| {
            script.set_onload(Some(&resolve));
            script.set_onerror(Some(&reject));
        });

        head.append_child(&script)?;
        tracing::debug!(url = %self.script_url, "Loading payment SDK script");
        JsFuture::from(loaded).await?;

        Ok(())
    }
}

#[async_trait(?Send)]
impl SdkLoader for CashfreeLoader {
    async fn load(&self, config: &SdkConfig) -> Result<Rc<dyn PaymentSdk>> {
        self.ensure_script()
            .await
            .map_err(|e| CheckoutError::SdkLoad(js_message(&e)))?;

        let instance = create_instance(config).map_err(|e| CheckoutError::SdkLoad(js_message(&e)))?;
        Ok(Rc::new(CashfreeSdk { instance }))
    }
}

fn create_instance(config: &SdkConfig) -> std::result::Result<JsValue, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let factory: Function = Reflect::get(&window, &JsValue::from_str(GLOBAL_FACTORY))?.dyn_into()?;

    let options = Object::new();
    Reflect::set(&options, &"mode".into(), &config.mode.as_str().into())?;

    factory.call1(&JsValue::NULL, &options)
}

/// Initialized Cashfree SDK instance
pub struct CashfreeSdk {
    instance: JsValue,
}

impl CashfreeSdk {
    fn launch(&self, options: &CheckoutOptions) -> std::result::Result<Promise, JsValue> {
        let checkout: Function = Reflect::get(&self.instance, &"checkout".into())?.dyn_into()?;

        let js_options = Object::new();
        Reflect::set(
            &js_options,
            &"paymentSessionId".into(),
            &options.payment_session_id.as_str().into(),
        )?;
        Reflect::set(
            &js_options,
            &"redirectTarget".into(),
            &options.redirect_target.as_str().into(),
        )?;

        checkout.call1(&self.instance, &js_options)?.dyn_into()
    }
}

#[async_trait(?Send)]
impl PaymentSdk for CashfreeSdk {
    async fn checkout(&self, options: &CheckoutOptions) -> Result<CheckoutResult> {
        let promise = self
            .launch(options)
            .map_err(|e| CheckoutError::CheckoutLaunch(js_message(&e)))?;

        let resolved = JsFuture::from(promise)
            .await
            .map_err(|e| CheckoutError::CheckoutLaunch(js_message(&e)))?;

        Ok(read_result(&resolved))
    }

    fn name(&self) -> &str {
        "Cashfree"
    }
}

/// Property of `value` that is neither `undefined` nor `null`
fn property(value: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Map `{ error?, redirect?, paymentDetails? }` onto [`CheckoutResult`]
fn read_result(value: &JsValue) -> CheckoutResult {
    let error = property(value, "error").map(|err| {
        property(&err, "message")
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| js_message(&err))
    });
    let message = property(value, "paymentDetails")
        .and_then(|details| property(&details, "paymentMessage"))
        .and_then(|m| m.as_string());

    CheckoutResult {
        redirected: property(value, "redirect").is_some(),
        message,
        error,
    }
}

/// Best-effort text for a thrown JS value
fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}
