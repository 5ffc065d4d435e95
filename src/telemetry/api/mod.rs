mod routes;

pub use routes::{
    FLOWMETER_IN, HVAC_DATA, HVAC_INFO, HVAC_SETTINGS, SET_RH_CATHLAB, SET_RH_MACHINE,
    SET_TEMP_CATHLAB, SET_TEMP_MACHINE, SET_UNIT_STATUS, VALUE_PARAM,
};
