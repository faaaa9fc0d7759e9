//! Error catalog of the notebook module.
//!
//! Each entry is rendered as an RFC 9457 problem at the REST boundary. The
//! `code` doubles as the `error.{code}` value of the alert error header.
use modkit_errors::ErrDef;

pub const ID_EXISTS: ErrDef = ErrDef {
    status: 400,
    title: "A new entity cannot already have an ID",
    code: "idexists",
    type_url: "https://errors.example.com/notebook/idexists",
};

pub const ID_NULL: ErrDef = ErrDef {
    status: 400,
    title: "Invalid id",
    code: "idnull",
    type_url: "https://errors.example.com/notebook/idnull",
};

pub const ID_INVALID: ErrDef = ErrDef {
    status: 400,
    title: "Invalid ID",
    code: "idinvalid",
    type_url: "https://errors.example.com/notebook/idinvalid",
};

pub const ID_NOT_FOUND: ErrDef = ErrDef {
    status: 400,
    title: "Entity not found",
    code: "idnotfound",
    type_url: "https://errors.example.com/notebook/idnotfound",
};

pub const NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not Found",
    code: "notfound",
    type_url: "https://errors.example.com/notebook/notfound",
};

pub const VALIDATION: ErrDef = ErrDef {
    status: 400,
    title: "Method argument not valid",
    code: "validation",
    type_url: "https://errors.example.com/notebook/validation",
};

pub const BAD_REQUEST: ErrDef = ErrDef {
    status: 400,
    title: "Bad Request",
    code: "badrequest",
    type_url: "https://errors.example.com/notebook/badrequest",
};

pub const INTERNAL: ErrDef = ErrDef {
    status: 500,
    title: "Internal error",
    code: "internal",
    type_url: "https://errors.example.com/notebook/internal",
};
