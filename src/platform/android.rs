// Android contacts through JNI.
//
// Every call attaches the current thread to the VM published by the NDK
// glue, fetches the hosting Activity, and talks to `ContactsContract`
// through its `ContentResolver`. Nothing is cached between calls, so the
// store survives the Activity being recreated.

#![cfg(target_os = "android")]

use jni::objects::{JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};

use crate::domain::{DataKind, NewContact, PhoneLabel, PhoneRow, RowResult};
use crate::errors::AppError;
use crate::permission::{Access, PermissionGate, PermissionStatus};
use crate::store::ContactsStore;

// ContactsContract column names and MIME types.
const CONTACT_ID: &str = "contact_id";
const RAW_CONTACT_ID: &str = "raw_contact_id";
const DISPLAY_NAME: &str = "display_name";
const MIMETYPE: &str = "mimetype";
const DATA1: &str = "data1";
const DATA2: &str = "data2";
const ACCOUNT_TYPE: &str = "account_type";
const ACCOUNT_NAME: &str = "account_name";
const NAME_ITEM_TYPE: &str = "vnd.android.cursor.item/name";
const PHONE_ITEM_TYPE: &str = "vnd.android.cursor.item/phone_v2";

const PHONE_CLASS: &str = "android/provider/ContactsContract$CommonDataKinds$Phone";
const RAW_CONTACTS_CLASS: &str = "android/provider/ContactsContract$RawContacts";
const DATA_CLASS: &str = "android/provider/ContactsContract$Data";

const READ_CONTACTS: &str = "android.permission.READ_CONTACTS";
const WRITE_CONTACTS: &str = "android.permission.WRITE_CONTACTS";
const PERMISSION_GRANTED: i32 = 0;

/// Request code handed to `requestPermissions`; the host Activity sees it
/// in `onRequestPermissionsResult`.
pub const CONTACTS_PERMISSION_CODE: i32 = 123;

fn java_vm() -> Result<JavaVM, AppError> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` registered by the NDK glue and
    // stays valid for the life of the process.
    unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to obtain JavaVM: {}", e)))
}

fn activity<'local>() -> Result<JObject<'local>, AppError> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(AppError::StoreUnavailable("Activity is null".to_string()));
    }
    // SAFETY: the NDK keeps this global reference to the hosting Activity
    // alive while native code runs.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Maps a JNI failure, clearing any pending Java exception so the next
/// call on this thread starts clean.
fn jni_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> AppError {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    AppError::StoreOperation(format!("{}: {}", context, e))
}

fn content_resolver<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject<'_>,
) -> Result<JObject<'local>, AppError> {
    let resolver = env
        .call_method(
            activity,
            "getContentResolver",
            "()Landroid/content/ContentResolver;",
            &[],
        )
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getContentResolver", e))?;

    if resolver.is_null() {
        return Err(AppError::StoreUnavailable(
            "Content Resolver is null".to_string(),
        ));
    }
    Ok(resolver)
}

fn content_uri<'local>(env: &mut JNIEnv<'local>, class: &str) -> Result<JObject<'local>, AppError> {
    env.get_static_field(class, "CONTENT_URI", "Landroid/net/Uri;")
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, &format!("{}.CONTENT_URI", class), e))
}

fn string_array<'local>(
    env: &mut JNIEnv<'local>,
    values: &[&str],
) -> Result<JObjectArray<'local>, AppError> {
    let array = env
        .new_object_array(values.len() as i32, "java/lang/String", JObject::null())
        .map_err(|e| jni_err(env, "new String[]", e))?;

    for (i, value) in values.iter().enumerate() {
        let element = env
            .new_string(value)
            .map_err(|e| jni_err(env, "new_string", e))?;
        env.set_object_array_element(&array, i as i32, &element)
            .map_err(|e| jni_err(env, "set_object_array_element", e))?;
    }
    Ok(array)
}

fn read_string(
    env: &mut JNIEnv<'_>,
    cursor: &JObject<'_>,
    column: &str,
) -> Result<Option<String>, AppError> {
    let j_column = env
        .new_string(column)
        .map_err(|e| jni_err(env, "new_string(column)", e))?;
    let index = env
        .call_method(
            cursor,
            "getColumnIndexOrThrow",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&j_column)],
        )
        .and_then(|v| v.i())
        .map_err(|e| jni_err(env, "getColumnIndexOrThrow", e))?;

    let value = env
        .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(index)])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "Cursor.getString", e))?;

    let out = if value.is_null() {
        None
    } else {
        let value = JString::from(value);
        let text: String = env
            .get_string(&value)
            .map_err(|e| jni_err(env, "get_string", e))?
            .into();
        env.delete_local_ref(value)
            .map_err(|e| jni_err(env, "delete_local_ref", e))?;
        Some(text)
    };
    env.delete_local_ref(j_column)
        .map_err(|e| jni_err(env, "delete_local_ref", e))?;
    Ok(out)
}

fn read_phone_row(env: &mut JNIEnv<'_>, cursor: &JObject<'_>) -> RowResult {
    Ok(PhoneRow {
        contact_id: read_string(env, cursor, CONTACT_ID)?,
        display_name: read_string(env, cursor, DISPLAY_NAME)?,
        number: read_string(env, cursor, DATA1)?,
    })
}

fn new_content_values<'local>(env: &mut JNIEnv<'local>) -> Result<JObject<'local>, AppError> {
    env.new_object("android/content/ContentValues", "()V", &[])
        .map_err(|e| jni_err(env, "new ContentValues", e))
}

fn put_string(
    env: &mut JNIEnv<'_>,
    values: &JObject<'_>,
    key: &str,
    value: &str,
) -> Result<(), AppError> {
    let j_key = env.new_string(key).map_err(|e| jni_err(env, "new_string(key)", e))?;
    let j_value = env
        .new_string(value)
        .map_err(|e| jni_err(env, "new_string(value)", e))?;
    env.call_method(
        values,
        "put",
        "(Ljava/lang/String;Ljava/lang/String;)V",
        &[JValue::Object(&j_key), JValue::Object(&j_value)],
    )
    .map_err(|e| jni_err(env, "ContentValues.put(String)", e))?;
    Ok(())
}

fn put_long(env: &mut JNIEnv<'_>, values: &JObject<'_>, key: &str, value: i64) -> Result<(), AppError> {
    let j_key = env.new_string(key).map_err(|e| jni_err(env, "new_string(key)", e))?;
    let boxed = env
        .new_object("java/lang/Long", "(J)V", &[JValue::Long(value)])
        .map_err(|e| jni_err(env, "new Long", e))?;
    env.call_method(
        values,
        "put",
        "(Ljava/lang/String;Ljava/lang/Long;)V",
        &[JValue::Object(&j_key), JValue::Object(&boxed)],
    )
    .map_err(|e| jni_err(env, "ContentValues.put(Long)", e))?;
    Ok(())
}

fn put_int(env: &mut JNIEnv<'_>, values: &JObject<'_>, key: &str, value: i32) -> Result<(), AppError> {
    let j_key = env.new_string(key).map_err(|e| jni_err(env, "new_string(key)", e))?;
    let boxed = env
        .new_object("java/lang/Integer", "(I)V", &[JValue::Int(value)])
        .map_err(|e| jni_err(env, "new Integer", e))?;
    env.call_method(
        values,
        "put",
        "(Ljava/lang/String;Ljava/lang/Integer;)V",
        &[JValue::Object(&j_key), JValue::Object(&boxed)],
    )
    .map_err(|e| jni_err(env, "ContentValues.put(Integer)", e))?;
    Ok(())
}

fn put_null(env: &mut JNIEnv<'_>, values: &JObject<'_>, key: &str) -> Result<(), AppError> {
    let j_key = env.new_string(key).map_err(|e| jni_err(env, "new_string(key)", e))?;
    env.call_method(values, "putNull", "(Ljava/lang/String;)V", &[JValue::Object(&j_key)])
        .map_err(|e| jni_err(env, "ContentValues.putNull", e))?;
    Ok(())
}

fn insert<'local>(
    env: &mut JNIEnv<'local>,
    resolver: &JObject<'_>,
    uri: &JObject<'_>,
    values: &JObject<'_>,
) -> Result<JObject<'local>, AppError> {
    env.call_method(
        resolver,
        "insert",
        "(Landroid/net/Uri;Landroid/content/ContentValues;)Landroid/net/Uri;",
        &[JValue::Object(uri), JValue::Object(values)],
    )
    .and_then(|v| v.l())
    .map_err(|e| jni_err(env, "ContentResolver.insert", e))
}

/// `TYPE_MOBILE` from `ContactsContract.CommonDataKinds.Phone`.
fn phone_type(label: PhoneLabel) -> i32 {
    match label {
        PhoneLabel::Mobile => 2,
    }
}

/// `ContactsContract` behind `ContentResolver`. Zero-sized; all state is on
/// the Java side.
#[derive(Debug, Default)]
pub struct AndroidContactsStore;

impl AndroidContactsStore {
    pub fn new() -> Self {
        Self
    }
}

impl ContactsStore for AndroidContactsStore {
    fn phone_rows(&self) -> Result<Vec<RowResult>, AppError> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;
        let activity = activity()?;
        let resolver = content_resolver(&mut env, &activity)?;
        let uri = content_uri(&mut env, PHONE_CLASS)?;
        let projection = string_array(&mut env, &[CONTACT_ID, DISPLAY_NAME, DATA1])?;

        let cursor = env
            .call_method(
                &resolver,
                "query",
                "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                &[
                    JValue::Object(&uri),
                    JValue::Object(&projection),
                    JValue::Object(&JObject::null()),
                    JValue::Object(&JObject::null()),
                    JValue::Object(&JObject::null()),
                ],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "ContentResolver.query", e))?;

        if cursor.is_null() {
            tracing::error!("phone query returned a null cursor");
            return Err(AppError::StoreOperation("Failed to query contacts".to_string()));
        }

        let mut rows = Vec::new();
        let outcome = loop {
            let has_next = env
                .call_method(&cursor, "moveToNext", "()Z", &[])
                .and_then(|v| v.z())
                .map_err(|e| jni_err(&mut env, "Cursor.moveToNext", e));
            match has_next {
                Ok(true) => rows.push(read_phone_row(&mut env, &cursor)),
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = env.call_method(&cursor, "close", "()V", &[]) {
            let _ = jni_err(&mut env, "Cursor.close", e);
        }

        outcome.map(|()| rows)
    }

    fn insert_contact(&mut self, contact: &NewContact) -> Result<String, AppError> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;
        let activity = activity()?;
        let resolver = content_resolver(&mut env, &activity)?;

        // Local (device-only) raw contact.
        let raw_values = new_content_values(&mut env)?;
        put_null(&mut env, &raw_values, ACCOUNT_TYPE)?;
        put_null(&mut env, &raw_values, ACCOUNT_NAME)?;
        let raw_uri = content_uri(&mut env, RAW_CONTACTS_CLASS)?;
        let created = insert(&mut env, &resolver, &raw_uri, &raw_values)?;
        if created.is_null() {
            return Err(AppError::StoreOperation("Failed to get raw contact ID".to_string()));
        }

        let segment = env
            .call_method(&created, "getLastPathSegment", "()Ljava/lang/String;", &[])
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "Uri.getLastPathSegment", e))?;
        if segment.is_null() {
            return Err(AppError::StoreOperation("Failed to get raw contact ID".to_string()));
        }
        let segment: String = env
            .get_string(&JString::from(segment))
            .map_err(|e| jni_err(&mut env, "get_string(segment)", e))?
            .into();
        let raw_contact_id: i64 = segment
            .parse()
            .map_err(|_| AppError::StoreOperation(format!("Unexpected raw contact ID '{}'", segment)))?;

        let data_uri = content_uri(&mut env, DATA_CLASS)?;

        let name_values = new_content_values(&mut env)?;
        put_long(&mut env, &name_values, RAW_CONTACT_ID, raw_contact_id)?;
        put_string(&mut env, &name_values, MIMETYPE, NAME_ITEM_TYPE)?;
        put_string(&mut env, &name_values, DATA1, &contact.name)?;
        insert(&mut env, &resolver, &data_uri, &name_values).map_err(|e| {
            AppError::StoreOperation(format!(
                "name write failed, raw contact {} left without data: {}",
                raw_contact_id, e
            ))
        })?;

        let phone_values = new_content_values(&mut env)?;
        put_long(&mut env, &phone_values, RAW_CONTACT_ID, raw_contact_id)?;
        put_string(&mut env, &phone_values, MIMETYPE, PHONE_ITEM_TYPE)?;
        put_string(&mut env, &phone_values, DATA1, &contact.phone)?;
        put_int(&mut env, &phone_values, DATA2, phone_type(contact.phone_label))?;
        insert(&mut env, &resolver, &data_uri, &phone_values).map_err(|e| {
            AppError::StoreOperation(format!(
                "phone write failed, raw contact {} left without a number: {}",
                raw_contact_id, e
            ))
        })?;

        Ok(segment)
    }

    fn update_data(&mut self, id: &str, kind: DataKind, value: &str) -> Result<usize, AppError> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;
        let activity = activity()?;
        let resolver = content_resolver(&mut env, &activity)?;

        let mimetype = match kind {
            DataKind::Name => NAME_ITEM_TYPE,
            DataKind::Phone => PHONE_ITEM_TYPE,
        };
        let values = new_content_values(&mut env)?;
        put_string(&mut env, &values, DATA1, value)?;

        let data_uri = content_uri(&mut env, DATA_CLASS)?;
        let selection = env
            .new_string(format!("{} = ? AND {} = ?", CONTACT_ID, MIMETYPE))
            .map_err(|e| jni_err(&mut env, "new_string(selection)", e))?;
        let args = string_array(&mut env, &[id, mimetype])?;

        let updated = env
            .call_method(
                &resolver,
                "update",
                "(Landroid/net/Uri;Landroid/content/ContentValues;Ljava/lang/String;[Ljava/lang/String;)I",
                &[
                    JValue::Object(&data_uri),
                    JValue::Object(&values),
                    JValue::Object(&selection),
                    JValue::Object(&args),
                ],
            )
            .and_then(|v| v.i())
            .map_err(|e| jni_err(&mut env, "ContentResolver.update", e))?;

        Ok(updated.max(0) as usize)
    }

    fn delete_contact(&mut self, id: &str) -> Result<usize, AppError> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;
        let activity = activity()?;
        let resolver = content_resolver(&mut env, &activity)?;

        let raw_uri = content_uri(&mut env, RAW_CONTACTS_CLASS)?;
        let selection = env
            .new_string(format!("{} = ?", CONTACT_ID))
            .map_err(|e| jni_err(&mut env, "new_string(selection)", e))?;
        let args = string_array(&mut env, &[id])?;

        let deleted = env
            .call_method(
                &resolver,
                "delete",
                "(Landroid/net/Uri;Ljava/lang/String;[Ljava/lang/String;)I",
                &[
                    JValue::Object(&raw_uri),
                    JValue::Object(&selection),
                    JValue::Object(&args),
                ],
            )
            .and_then(|v| v.i())
            .map_err(|e| jni_err(&mut env, "ContentResolver.delete", e))?;

        Ok(deleted.max(0) as usize)
    }

    fn medium(&self) -> &str {
        "android"
    }
}

/// `READ_CONTACTS` / `WRITE_CONTACTS` runtime permissions.
#[derive(Debug, Default)]
pub struct AndroidPermissions;

impl AndroidPermissions {
    pub fn new() -> Self {
        Self
    }

    fn permission_name(access: Access) -> &'static str {
        match access {
            Access::Read => READ_CONTACTS,
            Access::Write => WRITE_CONTACTS,
        }
    }
}

impl PermissionGate for AndroidPermissions {
    fn status(&self, access: Access) -> Result<PermissionStatus, AppError> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;
        let activity = activity()?;

        let permission = env
            .new_string(Self::permission_name(access))
            .map_err(|e| jni_err(&mut env, "new_string(permission)", e))?;
        let result = env
            .call_method(
                &activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&permission)],
            )
            .and_then(|v| v.i())
            .map_err(|e| jni_err(&mut env, "checkSelfPermission", e))?;

        Ok(if result == PERMISSION_GRANTED {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    fn request(&self, access: Access) -> Result<(), AppError> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;
        let activity = activity()?;

        let permissions = string_array(&mut env, &[Self::permission_name(access)])?;
        env.call_method(
            &activity,
            "requestPermissions",
            "([Ljava/lang/String;I)V",
            &[
                JValue::Object(&permissions),
                JValue::Int(CONTACTS_PERMISSION_CODE),
            ],
        )
        .map_err(|e| jni_err(&mut env, "requestPermissions", e))?;
        Ok(())
    }
}

/// `Android <Build.VERSION.RELEASE>`.
pub fn platform_version() -> Result<String, AppError> {
    let vm = java_vm()?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to attach JNI thread: {}", e)))?;

    let release = env
        .get_static_field("android/os/Build$VERSION", "RELEASE", "Ljava/lang/String;")
        .and_then(|v| v.l())
        .map_err(|e| jni_err(&mut env, "Build.VERSION.RELEASE", e))?;
    let release: String = env
        .get_string(&JString::from(release))
        .map_err(|e| jni_err(&mut env, "get_string(RELEASE)", e))?
        .into();

    Ok(format!("Android {}", release))
}
